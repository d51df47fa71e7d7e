//! Navigation surface and the authentication guard in front of it.

use std::fmt;

use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    About,
    Features,
    Pricing,
    Contact,
    Auth,
    ResetPassword,
    Terms,
    Privacy,
    Dashboard,
    CreateAiRoadmap,
    CreateCustomRoadmap,
    Roadmap(String),
}

impl Route {
    /// Match a path, ignoring any query string or trailing slash.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let route = match trimmed {
            "" => Self::Landing,
            "/about" => Self::About,
            "/features" => Self::Features,
            "/pricing" => Self::Pricing,
            "/contact" => Self::Contact,
            "/auth" => Self::Auth,
            "/reset-password" => Self::ResetPassword,
            "/terms" => Self::Terms,
            "/privacy" => Self::Privacy,
            "/dashboard" => Self::Dashboard,
            "/create/ai-roadmap" => Self::CreateAiRoadmap,
            "/create/custom-roadmap" => Self::CreateCustomRoadmap,
            other => {
                let id = other.strip_prefix("/roadmap/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Self::Roadmap(id.to_string())
            }
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::About => "/about".to_string(),
            Self::Features => "/features".to_string(),
            Self::Pricing => "/pricing".to_string(),
            Self::Contact => "/contact".to_string(),
            Self::Auth => "/auth".to_string(),
            Self::ResetPassword => "/reset-password".to_string(),
            Self::Terms => "/terms".to_string(),
            Self::Privacy => "/privacy".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::CreateAiRoadmap => "/create/ai-roadmap".to_string(),
            Self::CreateCustomRoadmap => "/create/custom-roadmap".to_string(),
            Self::Roadmap(id) => format!("/roadmap/{}", id),
        }
    }

    /// Needs a signed-in user with a confirmed email.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::Dashboard | Self::CreateAiRoadmap | Self::CreateCustomRoadmap | Self::Roadmap(_)
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What to do with a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still being restored; show a spinner
    Loading,
    Render,
    Redirect(Route),
    /// Signed in but the email link has not been followed yet
    AwaitEmailConfirmation,
}

pub fn guard(route: &Route, state: &SessionState) -> RouteDecision {
    let confirmed = state
        .identity
        .as_ref()
        .map(|identity| identity.user().is_email_confirmed());

    if *route == Route::Auth && confirmed == Some(true) {
        return RouteDecision::Redirect(Route::Dashboard);
    }
    if !route.is_protected() {
        return RouteDecision::Render;
    }
    if state.loading {
        return RouteDecision::Loading;
    }
    match confirmed {
        None => RouteDecision::Redirect(Route::Auth),
        Some(false) => RouteDecision::AwaitEmailConfirmation,
        Some(true) => RouteDecision::Render,
    }
}
