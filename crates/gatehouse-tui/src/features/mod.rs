pub mod forgot_password;
pub mod login;
pub mod page_chrome;
pub mod profile;
pub mod register;
pub mod reset_password;
pub mod shell;
