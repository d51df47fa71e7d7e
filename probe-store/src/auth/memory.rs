//! In-process auth double.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;

use super::{AuthBackend, AuthUser, Session, SignUpOutcome};
use crate::error::{Result, StoreError};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const EMAIL_NOT_CONFIRMED: &str = "Email not confirmed";
const INVALID_TOKEN: &str = "invalid JWT: unable to parse or verify signature";

struct Account {
    user: AuthUser,
    password: String,
}

/// Accounts and sessions held in memory.
///
/// Mirrors the hosted service's behaviour where the application depends on
/// it: unconfirmed accounts cannot sign in, tokens stop working after
/// sign-out, and sign-up returns only a user while confirmation is required.
#[derive(Default)]
pub struct MemoryAuth {
    accounts: DashMap<String, Account>,
    tokens: DashMap<String, String>,
    recoveries: DashMap<String, Option<String>>,
    auto_confirm: bool,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign-up confirms the email immediately and returns a session.
    pub fn with_auto_confirm(mut self) -> Self {
        self.auto_confirm = true;
        self
    }

    /// Register an account directly.
    pub fn add_user(&self, email: &str, password: &str, confirmed: bool) -> AuthUser {
        let user = AuthUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            email_confirmed_at: confirmed.then(Utc::now),
            user_metadata: json!({}),
        };
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Mark an account's email as confirmed.
    pub fn confirm_email(&self, email: &str) {
        if let Some(mut account) = self.accounts.get_mut(&email.to_lowercase()) {
            account.user.email_confirmed_at = Some(Utc::now());
        }
    }

    /// Issue a session without a password, as a recovery link would.
    pub fn issue_session(&self, email: &str) -> Option<Session> {
        let user = self.accounts.get(&email.to_lowercase())?.user.clone();
        Some(self.open_session(user))
    }

    /// Redirect target of the last recovery mail sent to `email`, if any was sent.
    pub fn recovery_sent(&self, email: &str) -> Option<Option<String>> {
        self.recoveries.get(&email.to_lowercase()).map(|r| r.value().clone())
    }

    /// Password currently set for `email`.
    pub fn password_of(&self, email: &str) -> Option<String> {
        self.accounts.get(&email.to_lowercase()).map(|a| a.password.clone())
    }

    pub fn active_sessions(&self) -> usize {
        self.tokens.len()
    }

    fn open_session(&self, user: AuthUser) -> Session {
        let access_token = uuid::Uuid::new_v4().to_string();
        self.tokens.insert(access_token.clone(), user.id.clone());
        Session {
            access_token,
            refresh_token: uuid::Uuid::new_v4().to_string(),
            expires_in: 3600,
            user,
        }
    }

    fn user_for_token(&self, access_token: &str) -> Result<AuthUser> {
        let user_id = self
            .tokens
            .get(access_token)
            .map(|id| id.value().clone())
            .ok_or_else(|| StoreError::Auth(INVALID_TOKEN.to_string()))?;
        self.accounts
            .iter()
            .find(|entry| entry.user.id == user_id)
            .map(|entry| entry.user.clone())
            .ok_or_else(|| StoreError::Auth(INVALID_TOKEN.to_string()))
    }
}

#[async_trait]
impl AuthBackend for MemoryAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let user = {
            let account = self
                .accounts
                .get(&email.to_lowercase())
                .filter(|a| a.password == password)
                .ok_or_else(|| StoreError::Auth(INVALID_CREDENTIALS.to_string()))?;
            if !account.user.is_email_confirmed() {
                return Err(StoreError::Auth(EMAIL_NOT_CONFIRMED.to_string()));
            }
            account.user.clone()
        };
        Ok(self.open_session(user))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        if self.accounts.contains_key(&email.to_lowercase()) {
            return Err(StoreError::Auth("User already registered".to_string()));
        }
        let user = self.add_user(email, password, self.auto_confirm);
        if self.auto_confirm {
            Ok(SignUpOutcome::SignedIn(self.open_session(user)))
        } else {
            Ok(SignUpOutcome::PendingConfirmation(user))
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.tokens.remove(access_token);
        Ok(())
    }

    async fn recover_password(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        // Unknown addresses succeed silently, as the hosted service does.
        if self.accounts.contains_key(&email.to_lowercase()) {
            self.recoveries
                .insert(email.to_lowercase(), redirect_to.map(str::to_string));
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        self.user_for_token(access_token)
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<AuthUser> {
        let user = self.user_for_token(access_token)?;
        let email = user.email.clone().unwrap_or_default().to_lowercase();
        if let Some(mut account) = self.accounts.get_mut(&email) {
            account.password = new_password.to_string();
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfirmed_cannot_sign_in() {
        let auth = MemoryAuth::new();
        let outcome = auth.sign_up("ada@example.com", "secret1").await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::PendingConfirmation(_)));

        let err = auth
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), EMAIL_NOT_CONFIRMED);

        auth.confirm_email("ada@example.com");
        let session = auth
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();
        assert!(session.user.is_email_confirmed());
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let auth = MemoryAuth::new();
        auth.add_user("ada@example.com", "secret1", true);
        let session = auth
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();
        assert!(auth.get_user(&session.access_token).await.is_ok());

        auth.sign_out(&session.access_token).await.unwrap();
        assert!(matches!(
            auth.get_user(&session.access_token).await,
            Err(StoreError::Auth(_))
        ));
        assert_eq!(auth.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let auth = MemoryAuth::new();
        auth.add_user("ada@example.com", "secret1", true);
        let err = auth
            .sign_in_with_password("ada@example.com", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_update_password() {
        let auth = MemoryAuth::new();
        auth.add_user("ada@example.com", "secret1", true);
        let session = auth.issue_session("ada@example.com").unwrap();

        auth.update_password(&session.access_token, "secret2").await.unwrap();
        assert_eq!(auth.password_of("ada@example.com").as_deref(), Some("secret2"));
    }
}
