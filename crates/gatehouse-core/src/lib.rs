//! Core gatehouse library (backend clients, session store, config).

pub mod backend;
pub mod config;
pub mod logging;
pub mod session;
pub mod validate;
