//! Client-side form validation.
//!
//! Validation runs before any network call; a failing field blocks
//! submission and renders its message inline.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

/// Validates an email address format.
///
/// # Errors
/// Returns the inline message to display when the address is malformed.
pub fn email(value: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err("Please enter a valid email address".to_string())
    }
}

/// Validates the minimum password length.
///
/// # Errors
/// Returns the inline message to display when the password is too short.
pub fn password(value: &str) -> Result<(), String> {
    if value.len() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ))
    }
}

/// Validates password-confirmation equality.
///
/// # Errors
/// Returns the inline message to display when the two entries differ.
pub fn confirmation(password: &str, confirm: &str) -> Result<(), String> {
    if password == confirm {
        Ok(())
    } else {
        Err("Passwords do not match".to_string())
    }
}

/// Validates a required field.
///
/// # Errors
/// Returns "`<label>` is required" when the trimmed value is empty.
pub fn required(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{label} is required"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_plain_addresses() {
        assert!(email("a@b.com").is_ok());
        assert!(email("first.last+tag@sub.domain.org").is_ok());
        assert!(email("  padded@example.com  ").is_ok());
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        for bad in ["", "plainaddress", "a@b", "a b@c.com", "@missing.local", "a@"] {
            assert!(email(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(password("12345").is_err());
        assert!(password("123456").is_ok());
        assert_eq!(
            password("short").unwrap_err(),
            "Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_confirmation_equality() {
        assert!(confirmation("secret1", "secret1").is_ok());
        assert_eq!(
            confirmation("secret1", "secret2").unwrap_err(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_required_uses_field_label() {
        assert_eq!(
            required("First name", "  ").unwrap_err(),
            "First name is required"
        );
        assert!(required("Last name", "Lovelace").is_ok());
    }
}
