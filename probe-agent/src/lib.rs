//! Probe Agent - roadmap generation
//!
//! Provides the pipeline that turns a [`roadmap::RoadmapRequest`] into a
//! validated [`roadmap::RoadmapContent`]:
//! - Trait-based LLM backends (Gemini, mock)
//! - Fixed sampling configuration
//! - Schema-validated parsing of the model output
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           RoadmapGenerator              │
//! │  (prompt → backend → parse/validate)    │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ LlmBackend  │       │  roadmap::  │
//! │ (Gemini/    │       │  parse      │
//! │  Mock)      │       │             │
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod generator;

// Re-export main types for convenience
pub use backend::traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, ModelCapabilities,
    SamplingConfig, Usage,
};
pub use generator::{
    Generation, GenerationError, RoadmapGenerator, ROADMAP_MODEL, ROADMAP_SAMPLING,
};
