//! Session context: the current identity and the auth operations that change it.
//!
//! A [`SessionContext`] is created once with [`SessionContext::init`], handed
//! to every screen, and closed with [`SessionContext::teardown`]. It is the
//! only writer of [`SessionState`]; observers hold `watch` receivers from
//! [`SessionContext::subscribe`] and see every change.
//!
//! Identity composition merges the auth user with their `user_profiles` row.
//! A failed profile fetch never blocks sign-in; it yields
//! [`Identity::Degraded`] instead.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use probe_store::{AuthBackend, AuthUser, ProbeData, Session, SignUpOutcome, StoreError, UserProfile};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::AppError;

/// Who is signed in.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// Auth user with their profile row
    Complete { user: AuthUser, profile: UserProfile },
    /// Profile could not be loaded; the user is still signed in
    Degraded { user: AuthUser, reason: String },
}

impl Identity {
    pub fn user(&self) -> &AuthUser {
        match self {
            Self::Complete { user, .. } | Self::Degraded { user, .. } => user,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Complete { profile, .. } => Some(profile),
            Self::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Snapshot published to observers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// True until the persisted session has been checked
    pub loading: bool,
}

// ============================================================================
// Persistence
// ============================================================================

/// Where tokens survive between runs.
pub trait SessionPersistence: Send + Sync {
    fn load(&self) -> Result<Option<Session>, AppError>;
    fn save(&self, session: &Session) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}

/// Session stored as JSON in a file.
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for FileSession {
    fn load(&self) -> Result<Option<Session>, AppError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Tokens are readable by the owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(&serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Session kept in memory only.
#[derive(Default)]
pub struct EphemeralSession {
    slot: Mutex<Option<Session>>,
}

impl EphemeralSession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionPersistence for EphemeralSession {
    fn load(&self) -> Result<Option<Session>, AppError> {
        Ok(self.slot.lock().map(|s| s.clone()).unwrap_or_default())
    }

    fn save(&self, session: &Session) -> Result<(), AppError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}

// ============================================================================
// Context
// ============================================================================

pub struct SessionContext {
    auth: Arc<dyn AuthBackend>,
    data: ProbeData,
    persistence: Arc<dyn SessionPersistence>,
    session: RwLock<Option<Session>>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionContext {
    /// A context in the loading state. Call [`restore`](Self::restore) to
    /// leave it; observers subscribed in between see the transition.
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        data: ProbeData,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState {
            identity: None,
            loading: true,
        });
        Self {
            auth,
            data,
            persistence,
            session: RwLock::new(None),
            state_tx,
        }
    }

    /// [`new`](Self::new) followed by [`restore`](Self::restore).
    pub async fn init(
        auth: Arc<dyn AuthBackend>,
        data: ProbeData,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self {
        let ctx = Self::new(auth, data, persistence);
        ctx.restore().await;
        ctx
    }

    /// Restore any persisted session, compose the identity and clear the
    /// loading flag.
    ///
    /// A persisted token the auth service no longer accepts is discarded.
    pub async fn restore(&self) {
        let stored = self.persistence.load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read saved session");
            None
        });

        let identity = match stored {
            Some(session) => match self.auth.get_user(&session.access_token).await {
                Ok(user) => {
                    debug!(user_id = %user.id, "Restored saved session");
                    let session = Session { user, ..session };
                    Some(self.install(session).await)
                }
                Err(e) => {
                    info!(error = %e, "Saved session rejected, signing out locally");
                    self.forget();
                    None
                }
            },
            None => None,
        };

        self.publish(identity);
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Current snapshot.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state_tx.borrow().identity.clone()
    }

    /// Access token of the active session.
    pub fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.access_token.clone()))
    }

    /// Typed table access, authorized as the current user.
    pub fn data(&self) -> &ProbeData {
        &self.data
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, StoreError> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        info!(user_id = %session.user.id, "Signed in");
        let identity = self.install(session).await;
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    /// Register. Signs in straight away only when the service skips email
    /// confirmation.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, StoreError> {
        let outcome = self.auth.sign_up(email, password).await?;
        info!(user_id = %outcome.user().id, "Signed up");
        if let SignUpOutcome::SignedIn(session) = &outcome {
            let identity = self.install(session.clone()).await;
            self.publish(Some(identity));
        }
        Ok(outcome)
    }

    /// Sign out. Local state is cleared even when the service call fails.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        let token = self.access_token();
        self.forget();
        self.publish(None);
        if let Some(token) = token {
            self.auth.sign_out(&token).await?;
        }
        info!("Signed out");
        Ok(())
    }

    /// Send a recovery mail whose link lands on `redirect_to`.
    pub async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), StoreError> {
        self.auth.recover_password(email, Some(redirect_to)).await
    }

    /// Adopt the token a recovery link carries.
    pub async fn adopt_access_token(&self, access_token: &str) -> Result<Identity, StoreError> {
        let user = self.auth.get_user(access_token).await?;
        let identity = self
            .install(Session {
                access_token: access_token.to_string(),
                refresh_token: String::new(),
                expires_in: 0,
                user,
            })
            .await;
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    /// Set a new password for the signed-in user, then sign out.
    pub async fn update_password(&self, new_password: &str) -> Result<(), AppError> {
        let token = self.access_token().ok_or(AppError::NotSignedIn)?;
        self.auth.update_password(&token, new_password).await?;
        info!("Password updated");
        self.sign_out().await?;
        Ok(())
    }

    /// Re-read the profile row, e.g. after a remaining count changed.
    pub async fn refresh_identity(&self) -> Option<Identity> {
        let user = self.identity()?.user().clone();
        let identity = self.compose(user).await;
        self.publish(Some(identity.clone()));
        Some(identity)
    }

    /// Close the state channel. Receivers observe the sender going away.
    pub fn teardown(self) {
        debug!(observers = self.state_tx.receiver_count(), "Session context torn down");
    }

    async fn install(&self, session: Session) -> Identity {
        self.data.store().set_access_token(Some(session.access_token.clone()));
        if let Err(e) = self.persistence.save(&session) {
            warn!(error = %e, "Could not save session");
        }
        let user = session.user.clone();
        if let Ok(mut slot) = self.session.write() {
            *slot = Some(session);
        }
        self.compose(user).await
    }

    fn forget(&self) {
        self.data.store().set_access_token(None);
        if let Ok(mut slot) = self.session.write() {
            *slot = None;
        }
        if let Err(e) = self.persistence.clear() {
            warn!(error = %e, "Could not clear saved session");
        }
    }

    async fn compose(&self, user: AuthUser) -> Identity {
        match self.data.profile(&user.id).await {
            Ok(profile) => Identity::Complete { user, profile },
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Profile unavailable, continuing without it");
                Identity::Degraded {
                    user,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn publish(&self, identity: Option<Identity>) {
        self.state_tx.send_replace(SessionState {
            identity,
            loading: false,
        });
    }
}
