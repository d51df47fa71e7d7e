//! Sign-in, sign-up, forgot-password and reset-password forms.

use probe_store::SignUpOutcome;
use tracing::info;

use super::form::Checks;
use super::report_failure;
use crate::error::AppError;
use crate::guard::SubmissionGuard;
use crate::routes::Route;
use crate::AppContext;

pub const INVALID_RESET_LINK: &str = "Invalid or expired password reset link";

// ============================================================================
// Sign in
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), AppError> {
        Checks::new()
            .email("email", &self.email)
            .password("password", &self.password)
            .finish()
    }
}

pub struct SignInScreen {
    ctx: AppContext,
    guard: SubmissionGuard,
}

impl SignInScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            guard: SubmissionGuard::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }

    /// Sign in and return where to go next.
    pub async fn submit(&self, form: &SignInForm) -> Result<Route, AppError> {
        form.validate()?;
        let _in_flight = self.guard.try_begin().ok_or(AppError::Busy)?;

        match self.ctx.session.sign_in(form.email.trim(), &form.password).await {
            Ok(_) => {
                self.ctx.toaster.success("Successfully signed in!");
                Ok(Route::Dashboard)
            }
            Err(e) => {
                let err = AppError::from(e);
                report_failure(&self.ctx.toaster, "sign_in", &err, "Error signing in");
                Err(err)
            }
        }
    }
}

// ============================================================================
// Sign up
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), AppError> {
        Checks::new()
            .email("email", &self.email)
            .password("password", &self.password)
            .matches("confirm_password", &self.password, &self.confirm_password)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpResult {
    /// A confirmation mail was sent; show the "check your email" panel
    AwaitingConfirmation,
    /// The service signed the user in directly
    SignedIn(Route),
}

pub struct SignUpScreen {
    ctx: AppContext,
    guard: SubmissionGuard,
}

impl SignUpScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            guard: SubmissionGuard::new(),
        }
    }

    pub async fn submit(&self, form: &SignUpForm) -> Result<SignUpResult, AppError> {
        form.validate()?;
        let _in_flight = self.guard.try_begin().ok_or(AppError::Busy)?;

        match self.ctx.session.sign_up(form.email.trim(), &form.password).await {
            Ok(SignUpOutcome::PendingConfirmation(_)) => {
                self.ctx
                    .toaster
                    .success("Please check your email to confirm your account");
                Ok(SignUpResult::AwaitingConfirmation)
            }
            Ok(SignUpOutcome::SignedIn(_)) => {
                self.ctx.toaster.success("Successfully signed up!");
                Ok(SignUpResult::SignedIn(Route::Dashboard))
            }
            Err(e) => {
                let err = AppError::from(e);
                report_failure(&self.ctx.toaster, "sign_up", &err, "Error signing up");
                Err(err)
            }
        }
    }
}

// ============================================================================
// Forgot password
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

pub struct ForgotPasswordScreen {
    ctx: AppContext,
    guard: SubmissionGuard,
}

impl ForgotPasswordScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            guard: SubmissionGuard::new(),
        }
    }

    /// Send recovery instructions; the link lands on the reset-password page.
    pub async fn submit(&self, form: &ForgotPasswordForm) -> Result<(), AppError> {
        Checks::new().email("email", &form.email).finish()?;
        let _in_flight = self.guard.try_begin().ok_or(AppError::Busy)?;

        let redirect_to = self.ctx.url_for(&Route::ResetPassword);
        match self.ctx.session.reset_password(form.email.trim(), &redirect_to).await {
            Ok(()) => {
                self.ctx
                    .toaster
                    .success("Password reset instructions sent to your email!");
                Ok(())
            }
            Err(e) => {
                let err = AppError::from(e);
                report_failure(&self.ctx.toaster, "forgot_password", &err, "Error sending reset instructions");
                Err(err)
            }
        }
    }
}

// ============================================================================
// Reset password
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), AppError> {
        Checks::new()
            .password("password", &self.password)
            .matches("confirm_password", &self.password, &self.confirm_password)
            .finish()
    }
}

pub struct ResetPasswordScreen {
    ctx: AppContext,
    guard: SubmissionGuard,
}

impl ResetPasswordScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            guard: SubmissionGuard::new(),
        }
    }

    /// Set the new password for the session opened by the recovery link,
    /// then sign out and send the user back to sign-in.
    pub async fn submit(&self, form: &ResetPasswordForm) -> Result<Route, AppError> {
        form.validate()?;
        let _in_flight = self.guard.try_begin().ok_or(AppError::Busy)?;

        if self.ctx.session.access_token().is_none() {
            let err = AppError::Rejected(INVALID_RESET_LINK.to_string());
            report_failure(&self.ctx.toaster, "reset_password", &err, INVALID_RESET_LINK);
            return Err(err);
        }

        match self.ctx.session.update_password(&form.password).await {
            Ok(()) => {
                info!("Password reset completed");
                self.ctx.toaster.success("Password updated successfully");
                Ok(Route::Auth)
            }
            Err(err) => {
                report_failure(&self.ctx.toaster, "reset_password", &err, "Error updating password");
                Err(err)
            }
        }
    }
}
