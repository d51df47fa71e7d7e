//! Parsing and validation of generated roadmap text.
//!
//! The model is asked for `{"sections": [...]}` but is free to wrap it in a
//! markdown code fence or get the shape wrong. [`parse_roadmap`] walks the
//! whole JSON tree and reports every violated field path instead of stopping
//! at the first one.
//!
//! Policy:
//! - empty `sections` or an empty `resources` list is a violation
//! - an empty `topics` list is accepted
//! - a resource `type` outside the four tags is normalized to `article`

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::types::{Resource, ResourceType, RoadmapContent, Section, Topic};

static FENCE: OnceLock<Regex> = OnceLock::new();

fn fence_pattern() -> &'static Regex {
    FENCE.get_or_init(|| Regex::new(r"(?i)```(?:json)?").expect("static fence pattern"))
}

/// Remove markdown code-fence markers and surrounding whitespace.
///
/// Idempotent: stripping an already stripped string returns it unchanged.
pub fn strip_code_fences(text: &str) -> String {
    fence_pattern().replace_all(text, "").trim().to_string()
}

/// What went wrong at a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Field is absent or null
    Missing,
    /// Field is present with the wrong JSON type
    WrongType { expected: &'static str },
    /// String is blank or list has no entries
    Empty,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::Empty => f.write_str("must not be empty"),
        }
    }
}

/// A single schema failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Path such as `sections[0].topics[2].resources`
    pub path: String,
    pub kind: ViolationKind,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// A recoverable fix applied while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalization {
    /// Path of the rewritten field
    pub path: String,
    /// Value the model produced
    pub original: String,
    /// Value stored instead
    pub replacement: ResourceType,
}

/// A validated roadmap plus the fixes applied to get there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoadmap {
    pub content: RoadmapContent,
    pub normalizations: Vec<Normalization>,
}

/// Error types for roadmap parsing.
#[derive(Debug, thiserror::Error)]
pub enum RoadmapParseError {
    /// Text is not JSON at all
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON does not match the roadmap schema
    #[error("response failed schema validation with {} violation(s)", .0.len())]
    Schema(Vec<SchemaViolation>),
}

impl RoadmapParseError {
    /// All schema violations (empty for JSON syntax errors).
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            Self::Json(_) => &[],
            Self::Schema(violations) => violations,
        }
    }
}

/// Strip fences, parse JSON and validate the full roadmap tree.
pub fn parse_roadmap(text: &str) -> Result<ParsedRoadmap, RoadmapParseError> {
    let cleaned = strip_code_fences(text);
    let value: Value = serde_json::from_str(&cleaned)?;
    validate_roadmap(&value)
}

/// Validate an already parsed JSON value.
pub fn validate_roadmap(value: &Value) -> Result<ParsedRoadmap, RoadmapParseError> {
    let mut walker = Walker::default();
    let content = walker.roadmap(value);

    match content {
        Some(content) if walker.violations.is_empty() => Ok(ParsedRoadmap {
            content,
            normalizations: walker.normalizations,
        }),
        _ => Err(RoadmapParseError::Schema(walker.violations)),
    }
}

/// Accumulates violations while building the typed tree.
///
/// Each node method returns `None` when anything beneath it failed, but keeps
/// visiting siblings so every problem is reported.
#[derive(Default)]
struct Walker {
    violations: Vec<SchemaViolation>,
    normalizations: Vec<Normalization>,
}

impl Walker {
    fn violation(&mut self, path: impl Into<String>, kind: ViolationKind) {
        self.violations.push(SchemaViolation {
            path: path.into(),
            kind,
        });
    }

    fn roadmap(&mut self, value: &Value) -> Option<RoadmapContent> {
        let obj = self.object(value, "$")?;
        let items = self.list(obj, "sections", "$", false)?;

        let sections: Vec<Option<Section>> = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.section(item, &format!("sections[{i}]")))
            .collect();

        sections
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .map(|sections| RoadmapContent { sections })
    }

    fn section(&mut self, value: &Value, path: &str) -> Option<Section> {
        let obj = self.object(value, path)?;
        let title = self.text(obj, "title", path, false);
        let description = self.text(obj, "description", path, false);
        let topics = self.list(obj, "topics", path, true).map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| self.topic(item, &format!("{path}.topics[{i}]")))
                .collect::<Vec<_>>()
        });

        Some(Section {
            title: title?,
            description: description?,
            topics: topics?.into_iter().collect::<Option<Vec<_>>>()?,
        })
    }

    fn topic(&mut self, value: &Value, path: &str) -> Option<Topic> {
        let obj = self.object(value, path)?;
        let title = self.text(obj, "title", path, false);
        let description = self.text(obj, "description", path, false);
        let resources = self.list(obj, "resources", path, false).map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| self.resource(item, &format!("{path}.resources[{i}]")))
                .collect::<Vec<_>>()
        });

        Some(Topic {
            title: title?,
            description: description?,
            resources: resources?.into_iter().collect::<Option<Vec<_>>>()?,
        })
    }

    fn resource(&mut self, value: &Value, path: &str) -> Option<Resource> {
        let obj = self.object(value, path)?;
        let title = self.text(obj, "title", path, true);
        let url = self.text(obj, "url", path, true);
        let tag = self.text(obj, "type", path, true);
        let description = self.text(obj, "description", path, true);

        let resource_type = tag.map(|tag| {
            ResourceType::from_tag(&tag).unwrap_or_else(|| {
                let replacement = ResourceType::default();
                self.normalizations.push(Normalization {
                    path: format!("{path}.type"),
                    original: tag,
                    replacement,
                });
                replacement
            })
        });

        Some(Resource {
            title: title?,
            url: url?,
            resource_type: resource_type?,
            description: description?,
        })
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(obj) => Some(obj),
            Value::Null => {
                self.violation(path, ViolationKind::Missing);
                None
            }
            _ => {
                self.violation(path, ViolationKind::WrongType { expected: "object" });
                None
            }
        }
    }

    fn text(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        parent: &str,
        allow_empty: bool,
    ) -> Option<String> {
        let path = join_path(parent, key);
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.violation(path, ViolationKind::Missing);
                None
            }
            Some(Value::String(s)) if !allow_empty && s.trim().is_empty() => {
                self.violation(path, ViolationKind::Empty);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.violation(path, ViolationKind::WrongType { expected: "string" });
                None
            }
        }
    }

    fn list<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
        parent: &str,
        allow_empty: bool,
    ) -> Option<&'v Vec<Value>> {
        let path = join_path(parent, key);
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.violation(path, ViolationKind::Missing);
                None
            }
            Some(Value::Array(items)) if !allow_empty && items.is_empty() => {
                self.violation(path, ViolationKind::Empty);
                None
            }
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.violation(path, ViolationKind::WrongType { expected: "array" });
                None
            }
        }
    }
}

/// Bare key at the root, `parent.key` below it.
fn join_path(parent: &str, key: &str) -> String {
    if parent == "$" {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(tag: &str) -> Value {
        json!({
            "title": "A Tour of Go",
            "url": "go.dev/tour",
            "type": tag,
            "description": "Interactive introduction"
        })
    }

    fn roadmap_with(resources: Vec<Value>) -> Value {
        json!({
            "sections": [{
                "title": "Basics",
                "description": "Language fundamentals",
                "topics": [{
                    "title": "Syntax",
                    "description": "Core syntax",
                    "resources": resources
                }]
            }]
        })
    }

    #[test]
    fn test_strip_code_fences() {
        let bare = r#"{"sections": []}"#;
        let fenced = format!("```json\n{bare}\n```");

        assert_eq!(strip_code_fences(&fenced), bare);
        assert_eq!(strip_code_fences(bare), bare);
        assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
    }

    #[test]
    fn test_strip_code_fences_idempotent() {
        let fenced = "  ```JSON\n{\"a\": 1}\n```  ";
        let once = strip_code_fences(fenced);
        assert_eq!(strip_code_fences(&once), once);
    }

    #[test]
    fn test_parse_valid_roadmap() {
        let text = roadmap_with(vec![resource("video")]).to_string();
        let parsed = parse_roadmap(&text).unwrap();

        assert!(parsed.normalizations.is_empty());
        let content = parsed.content;
        assert_eq!(content.section_count(), 1);
        assert_eq!(content.sections[0].title, "Basics");
        assert_eq!(content.sections[0].topics[0].title, "Syntax");
        let r = &content.sections[0].topics[0].resources[0];
        assert_eq!(r.resource_type, ResourceType::Video);
        assert_eq!(r.url, "go.dev/tour");
    }

    #[test]
    fn test_not_json() {
        let err = parse_roadmap("Sure! Here is your roadmap").unwrap_err();
        assert!(matches!(err, RoadmapParseError::Json(_)));
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_missing_and_empty_sections() {
        let err = parse_roadmap(r#"{"roadmap": []}"#).unwrap_err();
        assert_eq!(
            err.violations(),
            &[SchemaViolation {
                path: "sections".to_string(),
                kind: ViolationKind::Missing,
            }]
        );

        let err = parse_roadmap(r#"{"sections": []}"#).unwrap_err();
        assert_eq!(err.violations()[0].kind, ViolationKind::Empty);
    }

    #[test]
    fn test_bare_array_rejected() {
        let err = parse_roadmap("[]").unwrap_err();
        assert_eq!(
            err.violations()[0].kind,
            ViolationKind::WrongType { expected: "object" }
        );
    }

    #[test]
    fn test_empty_resources_rejected() {
        let err = parse_roadmap(&roadmap_with(vec![]).to_string()).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].path, "sections[0].topics[0].resources");
        assert_eq!(err.violations()[0].kind, ViolationKind::Empty);
    }

    #[test]
    fn test_unknown_resource_type_normalized() {
        let text = roadmap_with(vec![resource("podcast")]).to_string();
        let parsed = parse_roadmap(&text).unwrap();

        let r = &parsed.content.sections[0].topics[0].resources[0];
        assert_eq!(r.resource_type, ResourceType::Article);
        assert_eq!(r.title, "A Tour of Go");
        assert_eq!(r.description, "Interactive introduction");
        assert_eq!(
            parsed.normalizations,
            vec![Normalization {
                path: "sections[0].topics[0].resources[0].type".to_string(),
                original: "podcast".to_string(),
                replacement: ResourceType::Article,
            }]
        );
    }

    #[test]
    fn test_collects_every_violation() {
        let value = json!({
            "sections": [
                {
                    "title": "",
                    "description": "ok",
                    "topics": [{ "title": "t", "resources": [{ "title": "r" }] }]
                },
                { "title": "Second", "description": "ok", "topics": "none" }
            ]
        });

        let err = validate_roadmap(&value).unwrap_err();
        let paths: Vec<_> = err.violations().iter().map(|v| v.path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "sections[0].title",
                "sections[0].topics[0].description",
                "sections[0].topics[0].resources[0].url",
                "sections[0].topics[0].resources[0].type",
                "sections[0].topics[0].resources[0].description",
                "sections[1].topics",
            ]
        );
    }

    #[test]
    fn test_empty_topics_accepted() {
        let value = json!({
            "sections": [{ "title": "Wrap-up", "description": "Review", "topics": [] }]
        });

        let parsed = validate_roadmap(&value).unwrap();
        assert_eq!(parsed.content.topic_count(), 0);
    }
}
