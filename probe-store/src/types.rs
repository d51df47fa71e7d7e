//! Types for the store client

use std::fmt;

use chrono::{DateTime, Utc};
use roadmap::{RoadmapContent, RoadmapRequest, SkillLevel};
use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Public anon key sent as `apikey` on every request
    pub anon_key: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Remote collections the application touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    UserProfiles,
    Roadmaps,
    FeedbackMessages,
}

impl Collection {
    /// Table name on the server
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserProfiles => "user_profiles",
            Self::Roadmaps => "roadmaps",
            Self::FeedbackMessages => "feedback_messages",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Subscription tier stored in `user_profiles.role`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProfileTier {
    #[default]
    Free,
    Premium,
    /// Any role this client does not know about, kept verbatim
    Other(String),
}

impl From<String> for ProfileTier {
    fn from(role: String) -> Self {
        match role.as_str() {
            "free" => Self::Free,
            "premium" => Self::Premium,
            _ => Self::Other(role),
        }
    }
}

impl From<ProfileTier> for String {
    fn from(tier: ProfileTier) -> Self {
        match tier {
            ProfileTier::Free => "free".to_string(),
            ProfileTier::Premium => "premium".to_string(),
            ProfileTier::Other(role) => role,
        }
    }
}

/// Row of `user_profiles`, keyed by the auth user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub ai_roadmaps_remaining: u32,
    #[serde(default)]
    pub custom_roadmaps_remaining: u32,
    #[serde(default)]
    pub role: ProfileTier,
}

impl UserProfile {
    /// Creations left for the given roadmap kind
    pub fn remaining(&self, kind: RoadmapKind) -> u32 {
        match kind {
            RoadmapKind::Ai => self.ai_roadmaps_remaining,
            RoadmapKind::Custom => self.custom_roadmaps_remaining,
        }
    }
}

// ============================================================================
// Roadmaps
// ============================================================================

/// How a roadmap was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapKind {
    Ai,
    Custom,
}

impl RoadmapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Custom => "custom",
        }
    }

    /// Profile column counting the creations left for this kind
    pub fn remaining_column(&self) -> &'static str {
        match self {
            Self::Ai => "ai_roadmaps_remaining",
            Self::Custom => "custom_roadmaps_remaining",
        }
    }
}

impl fmt::Display for RoadmapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Private,
    Public,
}

/// Stored `roadmaps.content`: a generated tree, or text for custom roadmaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoadmapBody {
    Tree(RoadmapContent),
    Text(String),
}

impl RoadmapBody {
    pub fn as_tree(&self) -> Option<&RoadmapContent> {
        match self {
            Self::Tree(content) => Some(content),
            Self::Text(_) => None,
        }
    }
}

/// Insert payload for `roadmaps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRoadmap {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: RoadmapKind,
    #[serde(flatten)]
    pub request: RoadmapRequest,
    pub content: RoadmapBody,
    pub privacy: Privacy,
}

impl NewRoadmap {
    /// A private roadmap owned by `user_id`.
    pub fn new(
        user_id: impl Into<String>,
        kind: RoadmapKind,
        request: RoadmapRequest,
        content: RoadmapBody,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            request,
            content,
            privacy: Privacy::Private,
        }
    }
}

/// A persisted roadmap row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Roadmap {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: RoadmapKind,
    #[serde(flatten)]
    pub request: RoadmapRequest,
    pub content: RoadmapBody,
    #[serde(default)]
    pub privacy: Privacy,
    pub created_at: DateTime<Utc>,
}

/// Dashboard listing row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoadmapSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RoadmapKind,
    pub skill_level: SkillLevel,
    pub created_at: DateTime<Utc>,
}

impl RoadmapSummary {
    /// Columns fetched for the listing
    pub const COLUMNS: &'static str = "id,title,type,skill_level,created_at";
}

// ============================================================================
// Feedback
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    Unread,
    Read,
}

/// Insert payload for `feedback_messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFeedbackMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: FeedbackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_tier_keeps_unknown_roles() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "u1",
            "ai_roadmaps_remaining": 2,
            "custom_roadmaps_remaining": 0,
            "role": "enterprise"
        }))
        .unwrap();
        assert_eq!(profile.role, ProfileTier::Other("enterprise".into()));
        assert_eq!(profile.remaining(RoadmapKind::Ai), 2);
        assert_eq!(serde_json::to_value(&profile).unwrap()["role"], "enterprise");
    }

    #[test]
    fn test_new_roadmap_wire_shape() {
        let request = RoadmapRequest::new("Learn Go", SkillLevel::Beginner)
            .with_weekly_hours(5)
            .with_learning_style("video");
        let row = NewRoadmap::new(
            "u1",
            RoadmapKind::Custom,
            request,
            RoadmapBody::Text("placeholder".into()),
        );

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["type"], "custom");
        assert_eq!(value["privacy"], "private");
        assert_eq!(value["title"], "Learn Go");
        assert_eq!(value["time_commitment_hours"], 5);
        assert_eq!(value["learning_style"], json!(["video"]));
        assert_eq!(value["content"], "placeholder");
    }

    #[test]
    fn test_roadmap_row_body_variants() {
        let row = json!({
            "id": "r1",
            "user_id": "u1",
            "type": "ai",
            "title": "Learn Go",
            "skill_level": "beginner",
            "time_commitment_hours": 5,
            "learning_style": ["video"],
            "content": {"sections": []},
            "privacy": "private",
            "created_at": "2024-03-01T10:00:00.123456+00:00"
        });
        let roadmap: Roadmap = serde_json::from_value(row).unwrap();
        assert_eq!(roadmap.kind, RoadmapKind::Ai);
        assert_eq!(roadmap.request.weekly_hours, 5);
        assert!(roadmap.content.as_tree().is_some());
    }

    #[test]
    fn test_feedback_omits_missing_user() {
        let message = NewFeedbackMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            message: "Lovely roadmaps, thanks".into(),
            status: FeedbackStatus::Unread,
            user_id: None,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["status"], "unread");
        assert!(value.get("user_id").is_none());
    }
}
