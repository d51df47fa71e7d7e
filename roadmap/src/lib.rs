//! Roadmap content model for Probe
//!
//! This crate holds everything about a learning roadmap that does not need a
//! network connection:
//!
//! - **Request**: what the learner asked for (title, skill level, hours per
//!   week, preferred learning styles)
//! - **Content**: the section → topic → resource tree
//! - **Prompt**: the text sent to the generation service
//! - **Parse**: turning raw model output into a validated [`RoadmapContent`]
//!
//! # Key Components
//!
//! - [`RoadmapRequest`]: validated user input for a roadmap
//! - [`PromptAssembler`]: renders the generation prompt
//! - [`parse_roadmap`]: strips code fences, parses JSON and validates the whole
//!   tree, reporting every violated field path
//!
//! # Example
//!
//! ```
//! use roadmap::{parse_roadmap, PromptAssembler, RoadmapRequest, SkillLevel};
//!
//! let request = RoadmapRequest::new("Learn Go", SkillLevel::Beginner)
//!     .with_weekly_hours(5)
//!     .with_learning_style("video");
//! let prompt = PromptAssembler::build_roadmap_prompt(&request);
//! assert!(prompt.contains("Learn Go"));
//!
//! let raw = r#"{"sections": []}"#;
//! assert!(parse_roadmap(raw).is_err());
//! ```

pub mod parse;
pub mod prompt;
pub mod request;
pub mod types;

// Re-export main types
pub use parse::{
    parse_roadmap, strip_code_fences, Normalization, ParsedRoadmap, RoadmapParseError,
    SchemaViolation, ViolationKind,
};
pub use prompt::PromptAssembler;
pub use request::{FieldError, RoadmapRequest};
pub use types::*;
