//! Error types for the store client

use thiserror::Error;

/// Fallback shown when a failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Store client error
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// No row matched
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials rejected or session invalid
    #[error("Auth error: {0}")]
    Auth(String),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Message safe to show an end user.
    ///
    /// The service's own message when it sent one, otherwise a generic line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } | Self::Auth(message) if !message.trim().is_empty() => {
                message.clone()
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// Pull a human-readable message out of an error body.
    ///
    /// PostgREST sends `message`; GoTrue sends `msg` or
    /// `error_description`/`error` depending on the endpoint.
    pub(crate) fn message_from_body(body: &str) -> String {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        parsed
            .as_ref()
            .and_then(|v| {
                ["message", "msg", "error_description", "error"]
                    .iter()
                    .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
            })
            .map(str::to_string)
            .unwrap_or_else(|| body.trim().to_string())
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_body() {
        assert_eq!(
            StoreError::message_from_body(r#"{"code":"23505","message":"duplicate key"}"#),
            "duplicate key"
        );
        assert_eq!(
            StoreError::message_from_body(
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            "Invalid login credentials"
        );
        assert_eq!(StoreError::message_from_body(r#"{"code":422,"msg":"Signup disabled"}"#), "Signup disabled");
        assert_eq!(StoreError::message_from_body("bad gateway\n"), "bad gateway");
    }

    #[test]
    fn test_user_message() {
        let server = StoreError::Server {
            status: 409,
            message: "duplicate key".into(),
        };
        assert_eq!(server.user_message(), "duplicate key");

        let empty = StoreError::Server {
            status: 500,
            message: "  ".into(),
        };
        assert_eq!(empty.user_message(), GENERIC_FAILURE);
        assert_eq!(StoreError::NotFound("user_profiles".into()).user_message(), GENERIC_FAILURE);
        assert_eq!(StoreError::Auth("Email not confirmed".into()).user_message(), "Email not confirmed");
    }
}
