//! In-memory store for tests and offline runs.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use dashmap::DashMap;
use serde_json::Value;

use super::RemoteStore;
use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::types::Collection;

/// Rows held in process, one vector per collection.
///
/// Inserts get an `id` (UUID v4) and `created_at` when the row lacks them.
/// `created_at` is strictly increasing so newest-first ordering is stable.
#[derive(Default)]
pub struct MemoryStore {
    rows: DashMap<Collection, Vec<Value>>,
    failures: DashMap<Collection, String>,
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a row in place without defaults being filled in.
    pub fn seed(&self, collection: Collection, row: Value) {
        self.rows.entry(collection).or_default().push(row);
    }

    /// Make every operation on `collection` fail with a server error.
    pub fn fail_collection(&self, collection: Collection, message: impl Into<String>) {
        self.failures.insert(collection, message.into());
    }

    /// Undo [`fail_collection`](Self::fail_collection).
    pub fn heal_collection(&self, collection: Collection) {
        self.failures.remove(&collection);
    }

    /// Snapshot of a collection's rows in insertion order.
    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.rows
            .get(&collection)
            .map(|rows| rows.value().clone())
            .unwrap_or_default()
    }

    fn check(&self, collection: Collection) -> Result<()> {
        match self.failures.get(&collection) {
            Some(message) => Err(StoreError::Server {
                status: 500,
                message: message.value().clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_timestamp(&self) -> String {
        let mut last = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>> {
        self.check(collection)?;
        let mut rows: Vec<Value> = self
            .rows(collection)
            .into_iter()
            .filter(|row| query.matches(row))
            .collect();
        query.sort(&mut rows);
        Ok(rows.iter().map(|row| query.project(row)).collect())
    }

    async fn select_single(&self, collection: Collection, query: &Query) -> Result<Value> {
        let mut rows = self.select(collection, query).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(StoreError::NotFound(collection.to_string())),
            n => Err(StoreError::Server {
                status: 406,
                message: format!("expected one row from {collection}, found {n}"),
            }),
        }
    }

    async fn insert(&self, collection: Collection, mut row: Value) -> Result<Vec<Value>> {
        self.check(collection)?;
        let Value::Object(fields) = &mut row else {
            return Err(StoreError::InvalidResponse("row must be a JSON object".to_string()));
        };
        if !fields.contains_key("id") {
            fields.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
        if !fields.contains_key("created_at") {
            fields.insert("created_at".to_string(), Value::String(self.next_timestamp()));
        }
        self.rows.entry(collection).or_default().push(row.clone());
        Ok(vec![row])
    }

    async fn update(&self, collection: Collection, query: &Query, patch: Value) -> Result<Vec<Value>> {
        self.check(collection)?;
        let Value::Object(changes) = patch else {
            return Err(StoreError::InvalidResponse("patch must be a JSON object".to_string()));
        };
        let mut updated = Vec::new();
        if let Some(mut rows) = self.rows.get_mut(&collection) {
            for row in rows.iter_mut().filter(|row| query.matches(row)) {
                if let Value::Object(fields) = row {
                    for (key, value) in &changes {
                        fields.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }
}
