//! Authentication against the hosted auth service.
//!
//! [`AuthBackend`] covers the calls the application makes: password sign-in,
//! sign-up, sign-out, recovery mail, fetching the current user and changing
//! the password. Failures that the service attributes to the caller (bad
//! credentials, unconfirmed email, expired token) surface as
//! [`StoreError::Auth`](crate::StoreError::Auth) carrying the service's message.

pub mod gotrue;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use gotrue::GoTrueAuth;
pub use memory::MemoryAuth;

/// An authenticated user as the auth service reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl AuthUser {
    pub fn is_email_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// `user_metadata.full_name`, when the user gave one at sign-up
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata.get("full_name").and_then(|v| v.as_str())
    }
}

/// Tokens for a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
    pub user: AuthUser,
}

/// What sign-up produced.
///
/// With email confirmation enabled the service returns only the user;
/// otherwise the user is signed in straight away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    SignedIn(Session),
    PendingConfirmation(AuthUser),
}

impl SignUpOutcome {
    pub fn user(&self) -> &AuthUser {
        match self {
            Self::SignedIn(session) => &session.user,
            Self::PendingConfirmation(user) => user,
        }
    }
}

/// Auth service operations.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    /// Send a password recovery mail. `redirect_to` is where the link lands.
    async fn recover_password(&self, email: &str, redirect_to: Option<&str>) -> Result<()>;

    /// The user owning `access_token`; fails once the token is revoked or expired.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser>;

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<AuthUser>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signup_outcome_shapes() {
        let pending: SignUpOutcome = serde_json::from_value(json!({
            "id": "u1",
            "email": "ada@example.com",
            "confirmation_sent_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert!(matches!(pending, SignUpOutcome::PendingConfirmation(_)));
        assert!(!pending.user().is_email_confirmed());

        let signed_in: SignUpOutcome = serde_json::from_value(json!({
            "access_token": "jwt",
            "refresh_token": "r",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {"id": "u1", "email_confirmed_at": "2024-03-01T10:00:00Z"}
        }))
        .unwrap();
        assert!(matches!(signed_in, SignUpOutcome::SignedIn(_)));
        assert!(signed_in.user().is_email_confirmed());
    }

    #[test]
    fn test_full_name() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u1",
            "user_metadata": {"full_name": "Ada Lovelace"}
        }))
        .unwrap();
        assert_eq!(user.full_name(), Some("Ada Lovelace"));
    }
}
