//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use probe::{AppContext, EphemeralSession, SessionContext, Toaster};
use probe_agent::backend::traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, ModelCapabilities,
    Usage,
};
use probe_store::{AuthUser, Collection, MemoryAuth, MemoryStore, ProbeData};
use roadmap::{RoadmapRequest, SkillLevel};
use serde_json::json;
use tokio::sync::Notify;

pub const PASSWORD: &str = "secret1";

pub const GO_ROADMAP: &str = r#"{
    "sections": [{
        "title": "Basics",
        "description": "Language fundamentals",
        "topics": [{
            "title": "Syntax",
            "description": "Core syntax",
            "resources": [{
                "title": "Go by Example",
                "url": "gobyexample.com",
                "type": "video",
                "description": "Annotated examples"
            }]
        }]
    }]
}"#;

pub struct Fixture {
    pub auth: Arc<MemoryAuth>,
    pub store: Arc<MemoryStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            auth: Arc::new(MemoryAuth::new()),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// A confirmed account with a profile row.
    pub fn user(&self, email: &str, ai: u32, custom: u32, role: &str) -> AuthUser {
        let user = self.auth.add_user(email, PASSWORD, true);
        self.store.seed(
            Collection::UserProfiles,
            json!({
                "id": user.id,
                "ai_roadmaps_remaining": ai,
                "custom_roadmaps_remaining": custom,
                "role": role
            }),
        );
        user
    }

    pub async fn app(&self) -> AppContext {
        let session = SessionContext::init(
            self.auth.clone(),
            ProbeData::new(self.store.clone()),
            Arc::new(EphemeralSession::new()),
        )
        .await;
        AppContext::new(Arc::new(session), Toaster::default(), "http://localhost:5173")
    }

    /// An app with `email` already signed in.
    pub async fn signed_in(&self, email: &str) -> AppContext {
        let ctx = self.app().await;
        ctx.session.sign_in(email, PASSWORD).await.unwrap();
        ctx
    }

    pub fn remaining(&self, user_id: &str, column: &str) -> u64 {
        self.store
            .rows(Collection::UserProfiles)
            .iter()
            .find(|row| row["id"] == user_id)
            .and_then(|row| row[column].as_u64())
            .unwrap()
    }
}

pub fn go_request() -> RoadmapRequest {
    RoadmapRequest::new("Learn Go", SkillLevel::Beginner)
        .with_weekly_hours(5)
        .with_learning_style("video")
}

/// Backend that holds every completion until released.
pub struct GatedBackend {
    pub entered: Notify,
    pub release: Notify,
    calls: AtomicU32,
    capabilities: ModelCapabilities,
    response: String,
}

impl GatedBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicU32::new(0),
            capabilities: ModelCapabilities {
                context_window: 100_000,
                max_output_tokens: 8192,
            },
            response: response.into(),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for GatedBackend {
    fn id(&self) -> &str {
        "gated"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(CompletionResponse {
            content: self.response.clone(),
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        })
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }
}
