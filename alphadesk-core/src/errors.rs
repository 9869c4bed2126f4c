//! Error types for alphadesk.
//!
//! Every failure a caller can observe is a [`ClientError`]. The variants fall
//! into the classes the UI treats differently:
//!
//! - **Network**: no response was obtained (timeout, refused connection,
//!   aborted request). Safe to retry with backoff.
//! - **Auth**: a response was obtained but it rejects the credential or the
//!   submitted data. Shown to the user verbatim, never retried.
//! - **Unauthorized**: the session is gone for good. Credentials have already
//!   been purged and the unauthorized callback has fired.
//! - **Api**: any other backend failure envelope, handled by the caller.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// What went wrong when no response was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkErrorKind {
    /// The per-request deadline elapsed.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// The request was abandoned before completing.
    Aborted,
    /// Any other transport failure.
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Aborted => "aborted",
            Self::Other => "transport",
        };
        f.write_str(name)
    }
}

/// The main error type for alphadesk operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was obtained.
    #[error("Network error ({kind}): {message}")]
    Network {
        /// Failure kind.
        kind: NetworkErrorKind,
        /// Human-readable detail.
        message: String,
    },

    /// The backend rejected the credential or the submitted data.
    #[error("Authentication failed: {message}")]
    Auth {
        /// Message from the backend.
        message: String,
        /// Remaining login attempts, when the backend reports them.
        remaining_attempts: Option<u32>,
    },

    /// Credentials are permanently invalid and have been purged.
    #[error("Session expired")]
    Unauthorized,

    /// Any other non-success response.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the backend.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid client configuration or request construction.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Credential storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias using [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Create a network error.
    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self::Network {
            kind,
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::network(NetworkErrorKind::Timeout, message)
    }

    /// Create an authentication error without an attempts hint.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            remaining_attempts: None,
        }
    }

    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Build an error from a non-success status and its raw body.
    ///
    /// 400 and 401 are authentication-class; every other status is an
    /// ordinary API failure.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
        let message = parsed
            .message()
            .unwrap_or_else(|| format!("request failed ({status})"));

        match status {
            400 | 401 => Self::Auth {
                message,
                remaining_attempts: parsed.remaining_attempts(),
            },
            _ => Self::Api { status, message },
        }
    }

    /// Whether no response was obtained.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether this is an authentication-class rejection.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Whether the session has been terminated.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// Text suitable for showing next to the action that failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            } => "Request timed out, please try again later".to_string(),
            Self::Network { .. } => {
                "Network connection failed, please check your network and retry".to_string()
            }
            Self::Auth {
                message,
                remaining_attempts: Some(remaining),
            } => format!("{message} (remaining attempts: {remaining})"),
            Self::Auth { message, .. } => message.clone(),
            Self::Unauthorized => "Your session has expired, please sign in again".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Decode(_) => "Unexpected response from server".to_string(),
            Self::Configuration(msg) | Self::Storage(msg) => msg.clone(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(NetworkErrorKind::Timeout, err.to_string())
        } else if err.is_connect() {
            Self::network(NetworkErrorKind::Connect, err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::Configuration(err.to_string())
        } else {
            // request/body/redirect failures all mean no usable response
            Self::network(NetworkErrorKind::Other, err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Error envelope returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Always `false` when present.
    #[serde(default)]
    pub success: Option<bool>,
    /// Short error name or message.
    #[serde(default)]
    pub error: Option<String>,
    /// Detailed message; validation failures send a list.
    #[serde(default)]
    pub message: Option<ErrorMessage>,
    /// Server timestamp.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Login attempts left before lockout.
    #[serde(default)]
    pub remaining_attempts: Option<i64>,
}

/// A single message or a list of validation messages.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    /// One message.
    One(String),
    /// Several messages.
    Many(Vec<String>),
}

impl ErrorBody {
    /// Preferred message: `message`, then `error`.
    pub fn message(&self) -> Option<String> {
        let message = match &self.message {
            Some(ErrorMessage::One(m)) => Some(m.clone()),
            Some(ErrorMessage::Many(list)) if !list.is_empty() => Some(list.join("; ")),
            _ => None,
        };
        message
            .filter(|m| !m.is_empty())
            .or_else(|| self.error.clone().filter(|e| !e.is_empty()))
    }

    /// Remaining attempts, ignoring negative values.
    pub fn remaining_attempts(&self) -> Option<u32> {
        self.remaining_attempts
            .and_then(|n| u32::try_from(n).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(400, true)]
    #[case(401, true)]
    #[case(403, false)]
    #[case(404, false)]
    #[case(429, false)]
    #[case(500, false)]
    fn test_from_status_classification(#[case] status: u16, #[case] auth: bool) {
        let err = ClientError::from_status(status, r#"{"message":"nope"}"#);
        assert_eq!(err.is_auth(), auth);
        assert!(!err.is_network());
    }

    #[test]
    fn test_from_status_remaining_attempts() {
        let err = ClientError::from_status(
            401,
            r#"{"success":false,"message":"Invalid credentials","remainingAttempts":2}"#,
        );
        match &err {
            ClientError::Auth {
                message,
                remaining_attempts,
            } => {
                assert_eq!(message, "Invalid credentials");
                assert_eq!(*remaining_attempts, Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.user_message(),
            "Invalid credentials (remaining attempts: 2)"
        );
    }

    #[test]
    fn test_negative_remaining_attempts_ignored() {
        let err = ClientError::from_status(401, r#"{"message":"locked","remainingAttempts":-1}"#);
        assert_eq!(err.user_message(), "locked");
    }

    #[test]
    fn test_message_list_is_joined() {
        let err = ClientError::from_status(
            400,
            r#"{"message":["username too short","password too weak"]}"#,
        );
        assert_eq!(err.user_message(), "username too short; password too weak");
    }

    #[test]
    fn test_falls_back_to_error_field() {
        let err = ClientError::from_status(404, r#"{"error":"Not Found"}"#);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "Not Found");
    }

    #[test]
    fn test_unparseable_body_uses_generic_message() {
        let err = ClientError::from_status(502, "<html>bad gateway</html>");
        assert_eq!(err.user_message(), "request failed (502)");
    }

    #[test]
    fn test_network_messages() {
        let err = ClientError::timeout("deadline elapsed");
        assert!(err.is_network());
        assert_eq!(err.user_message(), "Request timed out, please try again later");

        let err = ClientError::network(NetworkErrorKind::Connect, "refused");
        assert!(err.user_message().contains("Network connection failed"));
    }

    #[test]
    fn test_unauthorized_is_distinct() {
        let err = ClientError::Unauthorized;
        assert!(err.is_unauthorized());
        assert!(!err.is_auth());
        assert!(!err.is_network());
        assert_eq!(err.status(), Some(401));
    }
}
