//! Contact form.

use probe_store::{FeedbackStatus, NewFeedbackMessage};
use tracing::{error, info};

use super::form::Checks;
use crate::error::AppError;
use crate::guard::SubmissionGuard;
use crate::session::Identity;
use crate::AppContext;

const SEND_FAILED: &str = "Failed to send message. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// Start from the signed-in user's name and email, when known.
    pub fn prefill(identity: Option<&Identity>) -> Self {
        let user = identity.map(Identity::user);
        Self {
            name: user
                .and_then(|u| u.full_name())
                .unwrap_or_default()
                .to_string(),
            email: user.and_then(|u| u.email.clone()).unwrap_or_default(),
            message: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        Checks::new()
            .min_chars("name", &self.name, 2, "Name must be at least 2 characters")
            .email("email", &self.email)
            .min_chars("message", &self.message, 10, "Message must be at least 10 characters")
            .finish()
    }
}

pub struct ContactScreen {
    ctx: AppContext,
    guard: SubmissionGuard,
}

impl ContactScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            guard: SubmissionGuard::new(),
        }
    }

    /// A form prefilled from the current identity.
    pub fn form(&self) -> ContactForm {
        ContactForm::prefill(self.ctx.session.identity().as_ref())
    }

    /// Store the message as unread feedback, linked to the user if signed in.
    pub async fn submit(&self, form: &ContactForm) -> Result<(), AppError> {
        form.validate()?;
        let _in_flight = self.guard.try_begin().ok_or(AppError::Busy)?;

        let message = NewFeedbackMessage {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            message: form.message.trim().to_string(),
            status: FeedbackStatus::Unread,
            user_id: self.ctx.session.identity().map(|i| i.user().id.clone()),
        };

        match self.ctx.session.data().insert_feedback(&message).await {
            Ok(()) => {
                info!(signed_in = message.user_id.is_some(), "Feedback received");
                self.ctx.toaster.success("Message sent successfully!");
                Ok(())
            }
            Err(e) => {
                // Store detail stays in the log.
                error!(error = %e, "Error sending message");
                self.ctx.toaster.error(SEND_FAILED);
                Err(e.into())
            }
        }
    }
}
