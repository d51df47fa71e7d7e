//! Dashboard: remaining creations and the user's roadmaps.

use probe_store::{ProfileTier, Roadmap, RoadmapKind, RoadmapSummary, UserProfile};
use tracing::error;

use crate::error::AppError;
use crate::AppContext;

const LOAD_FAILED: &str = "Failed to load dashboard data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub profile: UserProfile,
    /// Newest first
    pub roadmaps: Vec<RoadmapSummary>,
}

impl DashboardView {
    /// Whether the create button for `kind` is enabled.
    pub fn can_create(&self, kind: RoadmapKind) -> bool {
        self.profile.remaining(kind) > 0
    }

    pub fn show_upgrade_prompt(&self) -> bool {
        self.profile.role == ProfileTier::Free
    }
}

pub struct DashboardScreen {
    ctx: AppContext,
}

impl DashboardScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Load the profile and roadmap list concurrently.
    pub async fn load(&self) -> Result<DashboardView, AppError> {
        let identity = self.ctx.session.identity().ok_or(AppError::NotSignedIn)?;
        let user_id = identity.user().id.as_str();
        let data = self.ctx.session.data();

        match futures::try_join!(data.profile(user_id), data.roadmaps_for(user_id)) {
            Ok((profile, roadmaps)) => Ok(DashboardView { profile, roadmaps }),
            Err(e) => {
                error!(user_id, error = %e, "Error fetching dashboard data");
                self.ctx.toaster.error(LOAD_FAILED);
                Err(e.into())
            }
        }
    }

    /// Open one roadmap.
    pub async fn open(&self, roadmap_id: &str) -> Result<Roadmap, AppError> {
        self.ctx.session.identity().ok_or(AppError::NotSignedIn)?;
        self.ctx.session.data().roadmap(roadmap_id).await.map_err(|e| {
            error!(roadmap_id, error = %e, "Error fetching roadmap");
            self.ctx.toaster.error(e.user_message());
            AppError::from(e)
        })
    }
}
