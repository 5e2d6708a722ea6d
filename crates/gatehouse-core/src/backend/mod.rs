//! HTTP clients for the hosted auth/data backend.
//!
//! The backend exposes two REST surfaces: an auth API (token grants, signup,
//! recovery) and a data API (row fetch/patch by equality filter plus named
//! remote procedures). Everything durable lives server-side; these clients
//! are thin, stateless wrappers that normalize failures into [`BackendError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod auth;
pub mod profiles;
pub mod types;

pub use auth::AuthClient;
pub use profiles::{ProfileCache, ProfilesClient};

/// Standard User-Agent header for gatehouse API requests.
pub const USER_AGENT: &str = concat!("gatehouse/", env!("CARGO_PKG_VERSION"));

/// Categories of backend errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorKind {
    /// Transport failure: connection refused, DNS, timeout.
    Network,
    /// Request was rejected by the backend (4xx/5xx with a parsed body).
    Api,
    /// Failed to parse a response body.
    Parse,
    /// Anything else (should be rare).
    Unexpected,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendErrorKind::Network => write!(f, "network"),
            BackendErrorKind::Api => write!(f, "api"),
            BackendErrorKind::Parse => write!(f, "parse"),
            BackendErrorKind::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// Structured error from the backend with kind and optional stable code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendError {
    /// Error category.
    pub kind: BackendErrorKind,
    /// Stable machine-readable code forwarded from the backend, when present
    /// (e.g. `invalid_credentials`, `user_already_exists`).
    pub code: Option<String>,
    /// One-line summary suitable for display.
    pub message: String,
}

impl BackendError {
    /// Creates a new backend error.
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    /// Creates an API-rejection error from an HTTP status and raw body.
    ///
    /// Auth endpoints answer `{"error_code": "...", "msg": "..."}`; the data
    /// endpoints answer `{"code": "...", "message": "..."}`. Both are probed,
    /// falling back to the raw body when neither matches.
    pub fn api(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let code = parsed.as_ref().and_then(|json| {
            json.get("error_code")
                .and_then(Value::as_str)
                .or_else(|| json.get("code").and_then(Value::as_str))
                .map(str::to_string)
        });

        let message = parsed
            .as_ref()
            .and_then(|json| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|key| json.get(key).and_then(Value::as_str))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {body}")
                }
            });

        Self {
            kind: BackendErrorKind::Api,
            code,
            message,
        }
    }

    /// Creates a transport-level error from a reqwest failure.
    pub fn transport(err: &reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Self::new(BackendErrorKind::Network, err.to_string())
        } else if err.is_decode() {
            Self::new(BackendErrorKind::Parse, err.to_string())
        } else {
            Self::new(BackendErrorKind::Unexpected, err.to_string())
        }
    }

    /// Creates a response-parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Parse, message)
    }

    /// True when the failure is the transport, not a backend verdict.
    pub fn is_network(&self) -> bool {
        self.kind == BackendErrorKind::Network
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BackendError {}

/// Result type for backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Classified authentication failure, mapped to user-facing copy.
///
/// Classification prefers the backend's stable error code and falls back to
/// substring matching of the forwarded message only when no code is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidCredentials,
    UserNotFound,
    AlreadyRegistered,
    Network,
    Other(String),
}

impl AuthFailure {
    /// Classifies a backend error into a known failure category.
    pub fn classify(err: &BackendError) -> Self {
        if err.is_network() {
            return AuthFailure::Network;
        }

        if let Some(code) = err.code.as_deref() {
            match code {
                "invalid_credentials" | "invalid_grant" => {
                    return AuthFailure::InvalidCredentials;
                }
                "user_not_found" => return AuthFailure::UserNotFound,
                "user_already_exists" | "email_exists" => {
                    return AuthFailure::AlreadyRegistered;
                }
                _ => {}
            }
        }

        if err.message.contains("Invalid login credentials") {
            AuthFailure::InvalidCredentials
        } else if err.message.contains("User not found") {
            AuthFailure::UserNotFound
        } else if err.message.contains("already registered") {
            AuthFailure::AlreadyRegistered
        } else {
            AuthFailure::Other(err.message.clone())
        }
    }

    /// User-facing copy for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AuthFailure::InvalidCredentials => "Wrong email or password.".to_string(),
            AuthFailure::UserNotFound => "No account found with that email.".to_string(),
            AuthFailure::AlreadyRegistered => "Email is already registered.".to_string(),
            AuthFailure::Network => {
                "No internet connection. Please check your network.".to_string()
            }
            AuthFailure::Other(message) => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_parses_auth_body() {
        let body = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
        let err = BackendError::api(400, body);
        assert_eq!(err.kind, BackendErrorKind::Api);
        assert_eq!(err.code.as_deref(), Some("invalid_credentials"));
        assert_eq!(err.message, "Invalid login credentials");
    }

    #[test]
    fn test_api_error_parses_data_body() {
        let body = r#"{"code":"PGRST301","message":"JWT expired"}"#;
        let err = BackendError::api(401, body);
        assert_eq!(err.code.as_deref(), Some("PGRST301"));
        assert_eq!(err.message, "JWT expired");
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let err = BackendError::api(502, "Bad Gateway");
        assert!(err.code.is_none());
        assert_eq!(err.message, "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_classify_prefers_stable_code() {
        // Code wins even when the message text doesn't match any known pattern.
        let err = BackendError {
            kind: BackendErrorKind::Api,
            code: Some("user_already_exists".to_string()),
            message: "A user with this address exists".to_string(),
        };
        assert_eq!(AuthFailure::classify(&err), AuthFailure::AlreadyRegistered);
    }

    #[test]
    fn test_classify_falls_back_to_message_patterns() {
        let err = BackendError::new(BackendErrorKind::Api, "Invalid login credentials");
        assert_eq!(AuthFailure::classify(&err), AuthFailure::InvalidCredentials);

        let err = BackendError::new(BackendErrorKind::Api, "User not found");
        assert_eq!(AuthFailure::classify(&err), AuthFailure::UserNotFound);

        let err = BackendError::new(BackendErrorKind::Api, "Email already registered");
        assert_eq!(AuthFailure::classify(&err), AuthFailure::AlreadyRegistered);
    }

    #[test]
    fn test_classify_network_is_distinct_from_rejection() {
        let err = BackendError::new(BackendErrorKind::Network, "connection refused");
        assert_eq!(AuthFailure::classify(&err), AuthFailure::Network);
        assert_eq!(
            AuthFailure::Network.user_message(),
            "No internet connection. Please check your network."
        );
    }

    #[test]
    fn test_classify_unknown_forwards_message_verbatim() {
        let err = BackendError::new(BackendErrorKind::Api, "Signups not allowed for this instance");
        let failure = AuthFailure::classify(&err);
        assert_eq!(
            failure.user_message(),
            "Signups not allowed for this instance"
        );
    }
}
