//! Probe - learning roadmaps
//!
//! Application layer over the roadmap generator and the hosted data/auth
//! service:
//!
//! - [`session`]: the signed-in identity, passed explicitly to every screen
//! - [`screens`]: sign-in/up, password reset, contact, roadmap creation and
//!   the dashboard
//! - [`routes`]: the navigation surface and its authentication guard
//! - [`notify`]: transient success/error notifications
//! - [`config`]: CLI arguments and environment
//!
//! # Architecture
//!
//! ```text
//!  routes::guard ──► screens ──► SessionContext ──► AuthBackend
//!                       │              │
//!                       │              └──────────► ProbeData ──► RemoteStore
//!                       │
//!                       └──► RoadmapGenerator ──► LlmBackend
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod notify;
pub mod routes;
pub mod screens;
pub mod session;

use std::sync::Arc;

pub use error::AppError;
pub use guard::{InFlight, SubmissionGuard};
pub use notify::{Level, Notification, Toaster};
pub use routes::{Route, RouteDecision};
pub use session::{
    EphemeralSession, FileSession, Identity, SessionContext, SessionPersistence, SessionState,
};

/// Everything a screen needs, shared by cheap clones.
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<SessionContext>,
    pub toaster: Toaster,
    /// Public URL of the site; recovery links land on `{site_url}/reset-password`
    pub site_url: String,
}

impl AppContext {
    pub fn new(session: Arc<SessionContext>, toaster: Toaster, site_url: impl Into<String>) -> Self {
        Self {
            session,
            toaster,
            site_url: site_url.into(),
        }
    }

    /// Absolute URL for a route.
    pub fn url_for(&self, route: &Route) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), route.path())
    }
}
