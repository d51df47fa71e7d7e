//! Remote data access.
//!
//! [`RemoteStore`] is a thin pass-through to the hosted database: filtered
//! reads, inserts and patches against a named [`Collection`]. No retries,
//! no transactions. [`ProbeData`] layers typed helpers for the three tables
//! on top.

pub mod memory;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::types::*;

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Generic row access against named collections.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All rows matching `query`.
    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>>;

    /// Exactly one row matching `query`, or [`StoreError::NotFound`].
    async fn select_single(&self, collection: Collection, query: &Query) -> Result<Value>;

    /// Insert one row and return what the store persisted.
    async fn insert(&self, collection: Collection, row: Value) -> Result<Vec<Value>>;

    /// Patch every row matching `query` and return the updated rows.
    async fn update(&self, collection: Collection, query: &Query, patch: Value) -> Result<Vec<Value>>;

    /// Act on behalf of a signed-in user from now on. `None` reverts to the
    /// anonymous key.
    fn set_access_token(&self, _token: Option<String>) {}
}

/// Typed access to the application's tables.
#[derive(Clone)]
pub struct ProbeData {
    store: Arc<dyn RemoteStore>,
}

impl ProbeData {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Profile row for an auth user.
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile> {
        let row = self
            .store
            .select_single(Collection::UserProfiles, &Query::new().eq("id", user_id))
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    /// A user's roadmaps, newest first.
    pub async fn roadmaps_for(&self, user_id: &str) -> Result<Vec<RoadmapSummary>> {
        let query = Query::new()
            .select(RoadmapSummary::COLUMNS)
            .eq("user_id", user_id)
            .order("created_at", false);
        let rows = self.store.select(Collection::Roadmaps, &query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }

    /// A single roadmap by id.
    pub async fn roadmap(&self, id: &str) -> Result<Roadmap> {
        let row = self
            .store
            .select_single(Collection::Roadmaps, &Query::new().eq("id", id))
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Persist a roadmap and return the stored row.
    pub async fn insert_roadmap(&self, roadmap: &NewRoadmap) -> Result<Roadmap> {
        let rows = self
            .store
            .insert(Collection::Roadmaps, serde_json::to_value(roadmap)?)
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse("insert returned no rows".to_string()))?;
        let stored: Roadmap = serde_json::from_value(row)?;
        debug!(roadmap_id = %stored.id, kind = %stored.kind, "Roadmap stored");
        Ok(stored)
    }

    /// Overwrite the remaining-creations count for one roadmap kind.
    pub async fn set_remaining(&self, user_id: &str, kind: RoadmapKind, remaining: u32) -> Result<()> {
        let mut patch = serde_json::Map::new();
        patch.insert(kind.remaining_column().to_string(), json!(remaining));
        self.store
            .update(
                Collection::UserProfiles,
                &Query::new().eq("id", user_id),
                Value::Object(patch),
            )
            .await?;
        Ok(())
    }

    /// Record a contact-form message.
    pub async fn insert_feedback(&self, message: &NewFeedbackMessage) -> Result<()> {
        self.store
            .insert(Collection::FeedbackMessages, serde_json::to_value(message)?)
            .await?;
        Ok(())
    }
}
