//! RoadmapGenerator - the roadmap generation pipeline.
//!
//! prompt → one backend call → fence strip → JSON parse → schema validation.
//! Generation is all-or-nothing and never retried here; the caller decides
//! whether to try again.

use std::sync::Arc;
use std::time::Instant;

use roadmap::{
    parse_roadmap, Normalization, PromptAssembler, RoadmapContent, RoadmapParseError,
    RoadmapRequest,
};
use tracing::{debug, error, info, warn};

use crate::backend::traits::{
    CompletionRequest, FinishReason, LlmBackend, LlmError, SamplingConfig, Usage,
};

/// Model used for roadmap generation.
pub const ROADMAP_MODEL: &str = "gemini-2.0-flash-exp";

/// Fixed sampling parameters for roadmap generation.
pub const ROADMAP_SAMPLING: SamplingConfig = SamplingConfig {
    temperature: 0.7,
    top_p: 0.8,
    top_k: 40,
    max_output_tokens: 8192,
};

/// Error types for the generation pipeline.
///
/// The display strings are what end users see. Details live in the source
/// chain and in the logs.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Model output was not a valid roadmap
    #[error("Failed to generate valid roadmap structure")]
    Format(#[source] RoadmapParseError),

    /// Transport or service failure
    #[error("Failed to generate roadmap. Please try again.")]
    Service(#[source] LlmError),
}

/// A successful generation with its bookkeeping.
#[derive(Debug, Clone)]
pub struct Generation {
    pub content: RoadmapContent,
    /// Resource types rewritten to `article`
    pub normalizations: Vec<Normalization>,
    pub usage: Usage,
    pub duration_ms: u64,
}

/// Main entry point for roadmap generation.
pub struct RoadmapGenerator {
    backend: Arc<dyn LlmBackend>,
    sampling: SamplingConfig,
}

impl RoadmapGenerator {
    /// Create a generator with the fixed roadmap sampling parameters.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            sampling: ROADMAP_SAMPLING,
        }
    }

    /// Identifier of the backend in use.
    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Check whether the backend answers at all.
    pub async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    /// Generate a validated roadmap for `request`.
    ///
    /// The request is assumed to have passed [`RoadmapRequest::validate`].
    pub async fn generate(&self, request: &RoadmapRequest) -> Result<RoadmapContent, GenerationError> {
        self.generate_detailed(request).await.map(|g| g.content)
    }

    /// Like [`generate`](Self::generate) but also returns usage and the
    /// normalizations applied.
    pub async fn generate_detailed(
        &self,
        request: &RoadmapRequest,
    ) -> Result<Generation, GenerationError> {
        let start = Instant::now();

        let prompt = PromptAssembler::build_roadmap_prompt(request);
        let prompt_hash = PromptAssembler::fingerprint(&prompt);

        info!(
            backend = %self.backend.id(),
            prompt_hash = %prompt_hash,
            skill_level = %request.skill_level,
            weekly_hours = request.weekly_hours,
            "Generating roadmap"
        );

        let capabilities = self.backend.capabilities();
        let estimated = PromptAssembler::estimate_tokens(&prompt) as u32;
        if estimated > capabilities.context_window {
            let err = LlmError::ContextLengthExceeded {
                max: capabilities.context_window,
                actual: estimated,
            };
            error!(prompt_hash = %prompt_hash, error = %err, "Prompt too large for backend");
            return Err(GenerationError::Service(err));
        }

        let sampling = SamplingConfig {
            max_output_tokens: self.sampling.max_output_tokens.min(capabilities.max_output_tokens),
            ..self.sampling
        };

        let completion = self
            .backend
            .complete(CompletionRequest::user(prompt).with_sampling(sampling))
            .await
            .map_err(|e| {
                error!(prompt_hash = %prompt_hash, error = %e, "Error generating roadmap");
                GenerationError::Service(e)
            })?;

        if completion.finish_reason != FinishReason::Stop {
            warn!(
                prompt_hash = %prompt_hash,
                finish_reason = ?completion.finish_reason,
                "Generation stopped early, output may be truncated"
            );
        }

        let parsed = parse_roadmap(&completion.content).map_err(|e| {
            error!(
                prompt_hash = %prompt_hash,
                raw_response = %completion.content,
                error = %e,
                "Error parsing roadmap response"
            );
            for violation in e.violations() {
                error!(prompt_hash = %prompt_hash, path = %violation.path, kind = %violation.kind, "Schema violation");
            }
            GenerationError::Format(e)
        })?;

        for fix in &parsed.normalizations {
            debug!(path = %fix.path, original = %fix.original, replacement = %fix.replacement, "Normalized resource type");
        }
        if !parsed.normalizations.is_empty() {
            warn!(
                prompt_hash = %prompt_hash,
                count = parsed.normalizations.len(),
                "Replaced unknown resource types with article"
            );
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let content = parsed.content;

        info!(
            prompt_hash = %prompt_hash,
            sections = content.section_count(),
            topics = content.topic_count(),
            resources = content.resource_count(),
            tokens = completion.usage.total(),
            duration_ms,
            "Roadmap generated"
        );

        Ok(Generation {
            content,
            normalizations: parsed.normalizations,
            usage: completion.usage,
            duration_ms,
        })
    }
}
