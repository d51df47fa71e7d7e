//! LLM Backend abstraction layer.
//!
//! Provides a trait-based interface over text-generation services:
//! - Google Gemini (`generateContent` REST API)
//! - Mock backend for testing

pub mod gemini;
pub mod mock;
pub mod traits;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError, ModelCapabilities};
