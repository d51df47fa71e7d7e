//! Feature screens.
//!
//! Each screen owns a [`SubmissionGuard`](crate::guard::SubmissionGuard) and
//! follows the same shape on submit: validate the form, claim the guard, run,
//! emit exactly one notification, return a typed outcome. Validation failures
//! and busy rejections are returned without a notification; the form shows
//! those inline.

pub mod auth;
pub mod contact;
pub mod create_roadmap;
pub mod dashboard;
mod form;

pub use auth::{
    ForgotPasswordForm, ForgotPasswordScreen, ResetPasswordForm, ResetPasswordScreen, SignInForm,
    SignInScreen, SignUpForm, SignUpResult, SignUpScreen,
};
pub use contact::{ContactForm, ContactScreen};
pub use create_roadmap::{
    CreateAiRoadmapScreen, CreateCustomRoadmapScreen, CreatedRoadmap, AI_LEARNING_STYLES,
    CUSTOM_LEARNING_STYLES, CUSTOM_PLACEHOLDER,
};
pub use dashboard::{DashboardScreen, DashboardView};

use probe_store::GENERIC_FAILURE;
use tracing::error;

use crate::error::AppError;
use crate::notify::Toaster;

/// Log a failed submission and tell the user.
///
/// `fallback` replaces the generic line when the error carries no message
/// of its own.
pub(crate) fn report_failure(toaster: &Toaster, action: &'static str, err: &AppError, fallback: &str) {
    error!(action, error = %err, "Submission failed");
    let message = err.user_message();
    if message == GENERIC_FAILURE {
        toaster.error(fallback);
    } else {
        toaster.error(message);
    }
}
