//! Roadmap creation, AI-generated and custom.
//!
//! Both screens spend one of the user's remaining creations: check the
//! count, build the content, insert the roadmap, then write the count back
//! one lower. A failure anywhere before the insert leaves the count alone.

use std::sync::Arc;

use probe_agent::RoadmapGenerator;
use probe_store::{NewRoadmap, Roadmap, RoadmapBody, RoadmapKind};
use roadmap::RoadmapRequest;
use tracing::info;

use super::form::Checks;
use super::report_failure;
use crate::error::AppError;
use crate::guard::SubmissionGuard;
use crate::routes::Route;
use crate::AppContext;

/// Learning styles offered on the AI form; they steer resource types.
pub const AI_LEARNING_STYLES: [&str; 4] = ["books", "articles", "video", "interactive"];

/// Learning styles offered on the custom form.
pub const CUSTOM_LEARNING_STYLES: [&str; 6] = [
    "Visual",
    "Auditory",
    "Reading/Writing",
    "Kinesthetic",
    "Project-based",
    "Interactive",
];

/// Stored as the content of a custom roadmap until it is filled in.
pub const CUSTOM_PLACEHOLDER: &str = "Your custom roadmap content will be generated here.";

const CREATE_FAILED: &str = "Failed to create roadmap";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRoadmap {
    pub roadmap: Roadmap,
    pub navigate: Route,
}

fn validate(request: &RoadmapRequest, options: &[&str]) -> Result<(), AppError> {
    let unknown: Vec<&String> = request
        .learning_styles
        .iter()
        .filter(|style| !options.contains(&style.as_str()))
        .collect();

    let mut checks = Checks::new();
    if let Err(errors) = request.validate() {
        checks = checks.extend(errors);
    }
    if let Some(style) = unknown.first() {
        checks = checks.push("learning_style", format!("Unknown learning style: {}", style));
    }
    checks.finish()
}

/// Shared steps of both creation flows.
struct Creation<'a> {
    ctx: &'a AppContext,
    kind: RoadmapKind,
}

impl Creation<'_> {
    fn exhausted_message(&self) -> &'static str {
        match self.kind {
            RoadmapKind::Ai => "No AI roadmaps remaining",
            RoadmapKind::Custom => "No custom roadmaps remaining",
        }
    }

    /// Fresh remaining count for the signed-in user.
    async fn reserve(&self) -> Result<(String, u32), AppError> {
        let identity = self.ctx.session.identity().ok_or(AppError::NotSignedIn)?;
        let user_id = identity.user().id.clone();
        let remaining = self.ctx.session.data().profile(&user_id).await?.remaining(self.kind);
        if remaining == 0 {
            return Err(AppError::Rejected(self.exhausted_message().to_string()));
        }
        Ok((user_id, remaining))
    }

    async fn persist(
        &self,
        user_id: &str,
        remaining: u32,
        request: &RoadmapRequest,
        body: RoadmapBody,
    ) -> Result<Roadmap, AppError> {
        let data = self.ctx.session.data();
        let roadmap = data
            .insert_roadmap(&NewRoadmap::new(user_id, self.kind, request.clone(), body))
            .await?;
        data.set_remaining(user_id, self.kind, remaining - 1).await?;
        self.ctx.session.refresh_identity().await;

        info!(
            roadmap_id = %roadmap.id,
            kind = %self.kind,
            remaining = remaining - 1,
            "Roadmap created"
        );
        Ok(roadmap)
    }
}

// ============================================================================
// AI roadmap
// ============================================================================

pub struct CreateAiRoadmapScreen {
    ctx: AppContext,
    generator: Arc<RoadmapGenerator>,
    guard: SubmissionGuard,
}

impl CreateAiRoadmapScreen {
    pub fn new(ctx: AppContext, generator: Arc<RoadmapGenerator>) -> Self {
        Self {
            ctx,
            generator,
            guard: SubmissionGuard::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }

    /// Generate, store and open a roadmap.
    ///
    /// A second call while one is running fails with [`AppError::Busy`]
    /// without reaching the generation service.
    pub async fn submit(&self, request: &RoadmapRequest) -> Result<CreatedRoadmap, AppError> {
        validate(request, &AI_LEARNING_STYLES)?;
        let _in_flight = self.guard.try_begin().ok_or(AppError::Busy)?;

        match self.run(request).await {
            Ok(roadmap) => {
                self.ctx.toaster.success("AI roadmap created successfully!");
                Ok(CreatedRoadmap {
                    navigate: Route::Roadmap(roadmap.id.clone()),
                    roadmap,
                })
            }
            Err(err) => {
                report_failure(&self.ctx.toaster, "create_ai_roadmap", &err, CREATE_FAILED);
                Err(err)
            }
        }
    }

    async fn run(&self, request: &RoadmapRequest) -> Result<Roadmap, AppError> {
        let creation = Creation {
            ctx: &self.ctx,
            kind: RoadmapKind::Ai,
        };
        let (user_id, remaining) = creation.reserve().await?;
        let content = self.generator.generate(request).await?;
        creation
            .persist(&user_id, remaining, request, RoadmapBody::Tree(content))
            .await
    }
}

// ============================================================================
// Custom roadmap
// ============================================================================

pub struct CreateCustomRoadmapScreen {
    ctx: AppContext,
    guard: SubmissionGuard,
}

impl CreateCustomRoadmapScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            guard: SubmissionGuard::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }

    /// Store a roadmap with placeholder content and return to the dashboard.
    pub async fn submit(&self, request: &RoadmapRequest) -> Result<CreatedRoadmap, AppError> {
        validate(request, &CUSTOM_LEARNING_STYLES)?;
        let _in_flight = self.guard.try_begin().ok_or(AppError::Busy)?;

        let creation = Creation {
            ctx: &self.ctx,
            kind: RoadmapKind::Custom,
        };
        let result = match creation.reserve().await {
            Ok((user_id, remaining)) => {
                let body = RoadmapBody::Text(CUSTOM_PLACEHOLDER.to_string());
                creation.persist(&user_id, remaining, request, body).await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(roadmap) => {
                self.ctx.toaster.success("Custom roadmap created successfully!");
                Ok(CreatedRoadmap {
                    roadmap,
                    navigate: Route::Dashboard,
                })
            }
            Err(err) => {
                report_failure(&self.ctx.toaster, "create_custom_roadmap", &err, CREATE_FAILED);
                Err(err)
            }
        }
    }
}
