//! Core types for roadmap content.
//!
//! These mirror the JSON stored in the `roadmaps.content` column and the shape
//! the generation prompt asks the model to return.
//!
//! With the `typescript` feature enabled, these types can be exported to TypeScript
//! using ts-rs for consistency with the web frontend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Learner skill level.
///
/// Only shapes the prompt; nothing downstream branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Get string representation for prompts and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// All levels, easiest first
    pub fn all() -> [Self; 3] {
        [Self::Beginner, Self::Intermediate, Self::Advanced]
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised enum literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for SkillLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "skill level",
                value: s.to_string(),
            })
    }
}

/// Kind of learning resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Book,
    /// Fallback for anything the model invents
    #[default]
    Article,
    Video,
    Interactive,
}

impl ResourceType {
    /// The four literal tags the model is allowed to use.
    pub const ALL: [Self; 4] = [Self::Book, Self::Article, Self::Video, Self::Interactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Article => "article",
            Self::Video => "video",
            Self::Interactive => "interactive",
        }
    }

    /// Exact match on the literal tag. Case matters: the prompt asks for lowercase.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single external learning resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Resource {
    pub title: String,
    /// Not checked to be a real URL; the prompt asks for realistic fictional ones
    pub url: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub description: String,
}

/// A topic within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Topic {
    pub title: String,
    pub description: String,
    /// Never empty once validated
    pub resources: Vec<Resource>,
}

/// A section of a roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Section {
    pub title: String,
    pub description: String,
    pub topics: Vec<Topic>,
}

/// The full generated roadmap tree.
///
/// Serializes to the same `{"sections": [...]}` envelope the model returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RoadmapContent {
    /// At least one section once validated
    pub sections: Vec<Section>,
}

impl RoadmapContent {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn topic_count(&self) -> usize {
        self.sections.iter().map(|s| s.topics.len()).sum()
    }

    pub fn resource_count(&self) -> usize {
        self.topics().map(|t| t.resources.len()).sum()
    }

    /// All topics in document order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.sections.iter().flat_map(|s| s.topics.iter())
    }
}
