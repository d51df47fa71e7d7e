//! Client for the hosted data and auth service behind Probe
//!
//! Two seams, each with an HTTP implementation and an in-memory double:
//!
//! - [`RemoteStore`]: filtered reads, inserts and patches on the
//!   `user_profiles`, `roadmaps` and `feedback_messages` tables
//!   ([`RestStore`], [`MemoryStore`]), with typed helpers in [`ProbeData`]
//! - [`AuthBackend`]: password auth, recovery and session checks
//!   ([`GoTrueAuth`], [`MemoryAuth`])
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use probe_store::{ProbeData, RestStore, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RestStore::new(StoreConfig {
//!     base_url: "https://project.supabase.co".into(),
//!     anon_key: "public-anon-key".into(),
//!     ..Default::default()
//! })?;
//! let data = ProbeData::new(Arc::new(store));
//!
//! let profile = data.profile("user-id").await?;
//! println!("{} AI roadmaps left", profile.ai_roadmaps_remaining);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod query;
pub mod store;
pub mod types;

// Re-export main types
pub use auth::{AuthBackend, AuthUser, GoTrueAuth, MemoryAuth, Session, SignUpOutcome};
pub use error::{Result, StoreError, GENERIC_FAILURE};
pub use query::Query;
pub use store::{MemoryStore, ProbeData, RemoteStore, RestStore};
pub use types::*;
