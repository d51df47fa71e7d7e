//! Roadmap request types.

use serde::{Deserialize, Serialize};

use crate::types::SkillLevel;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Minimum title length accepted by the creation forms.
pub const MIN_TITLE_CHARS: usize = 3;

/// Minimum weekly time commitment in hours.
pub const MIN_WEEKLY_HOURS: u32 = 1;

/// A validation failure on a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct FieldError {
    /// Field name as it appears on the form
    pub field: String,
    /// Message shown next to the field
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// What a learner asked for.
///
/// Field names on the wire match the `roadmaps` table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RoadmapRequest {
    pub title: String,
    pub skill_level: SkillLevel,
    #[serde(rename = "time_commitment_hours")]
    pub weekly_hours: u32,
    /// Free-text tags, kept in selection order without duplicates
    #[serde(rename = "learning_style")]
    pub learning_styles: Vec<String>,
}

impl RoadmapRequest {
    /// Create a request with no learning styles selected yet.
    pub fn new(title: impl Into<String>, skill_level: SkillLevel) -> Self {
        Self {
            title: title.into(),
            skill_level,
            weekly_hours: MIN_WEEKLY_HOURS,
            learning_styles: Vec::new(),
        }
    }

    /// Builder: set weekly hours.
    pub fn with_weekly_hours(mut self, hours: u32) -> Self {
        self.weekly_hours = hours;
        self
    }

    /// Builder: add a learning style (ignored if already selected).
    pub fn with_learning_style(mut self, style: impl Into<String>) -> Self {
        let style = style.into();
        if !self.learning_styles.contains(&style) {
            self.learning_styles.push(style);
        }
        self
    }

    /// Select the style if absent, deselect it if present.
    pub fn toggle_learning_style(&mut self, style: &str) {
        if let Some(pos) = self.learning_styles.iter().position(|s| s == style) {
            self.learning_styles.remove(pos);
        } else {
            self.learning_styles.push(style.to_string());
        }
    }

    /// Learning styles as the comma-joined list used in prompts.
    pub fn styles_joined(&self) -> String {
        self.learning_styles.join(", ")
    }

    /// Check every field and report all failures at once.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.title.trim().chars().count() < MIN_TITLE_CHARS {
            errors.push(FieldError::new(
                "title",
                format!("Title must be at least {MIN_TITLE_CHARS} characters"),
            ));
        }

        if self.weekly_hours < MIN_WEEKLY_HOURS {
            errors.push(FieldError::new(
                "time_commitment_hours",
                "Time commitment must be at least 1 hour",
            ));
        }

        if self.learning_styles.iter().all(|s| s.trim().is_empty()) {
            errors.push(FieldError::new(
                "learning_style",
                "Select at least one learning style",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = RoadmapRequest::new("Learn Go", SkillLevel::Beginner)
            .with_weekly_hours(5)
            .with_learning_style("video")
            .with_learning_style("video")
            .with_learning_style("books");

        assert_eq!(request.weekly_hours, 5);
        assert_eq!(request.learning_styles, vec!["video", "books"]);
        assert_eq!(request.styles_joined(), "video, books");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_toggle_learning_style() {
        let mut request = RoadmapRequest::new("Learn Go", SkillLevel::Beginner);
        request.toggle_learning_style("video");
        request.toggle_learning_style("interactive");
        request.toggle_learning_style("video");

        assert_eq!(request.learning_styles, vec!["interactive"]);
    }

    #[test]
    fn test_validate_reports_every_field() {
        let request = RoadmapRequest::new("Go", SkillLevel::Advanced).with_weekly_hours(0);

        let errors = request.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["title", "time_commitment_hours", "learning_style"]
        );
        assert_eq!(errors[0].message, "Title must be at least 3 characters");
    }

    #[test]
    fn test_wire_names_match_columns() {
        let request = RoadmapRequest::new("Learn Rust", SkillLevel::Intermediate)
            .with_weekly_hours(10)
            .with_learning_style("articles");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["skill_level"], "intermediate");
        assert_eq!(json["time_commitment_hours"], 10);
        assert_eq!(json["learning_style"][0], "articles");
    }
}
