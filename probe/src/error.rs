//! Application error type.
//!
//! Every failure a screen can hit ends up here. [`AppError::user_message`]
//! is what a notification shows; the `Display` form is for logs.

use probe_agent::GenerationError;
use probe_store::StoreError;
use roadmap::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Form input failed validation
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A submission from the same form is still running
    #[error("a submission is already in flight")]
    Busy,

    /// The action needs a signed-in user
    #[error("not signed in")]
    NotSignedIn,

    /// Remote data or auth failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Roadmap generation failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A business rule refused the action; the message is user-facing
    #[error("{0}")]
    Rejected(String),

    /// Startup configuration problem
    #[error("configuration error: {0}")]
    Config(String),

    /// Local session file problem
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Text safe to show an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Please check the form".to_string()),
            Self::Busy => "Please wait for the current request to finish".to_string(),
            Self::NotSignedIn => "Please sign in to continue".to_string(),
            Self::Store(e) => e.user_message(),
            Self::Generation(e) => e.to_string(),
            Self::Rejected(message) => message.clone(),
            Self::Config(_) | Self::Io(_) | Self::Json(_) => {
                probe_store::GENERIC_FAILURE.to_string()
            }
        }
    }

    /// Field errors, when this is a validation failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}
