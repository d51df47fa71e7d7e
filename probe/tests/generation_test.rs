//! Generation pipeline integration tests
//!
//! Runs the generator against a mocked Gemini endpoint:
//! - Prompt and fixed sampling on the wire
//! - Fenced and unfenced output parse to the same tree
//! - Structural failures rejected, unknown resource types normalized
//! - Service errors surfaced with the user-facing message

use std::sync::Arc;

use probe_agent::backend::GeminiBackend;
use probe_agent::{GenerationError, RoadmapGenerator, ROADMAP_MODEL};
use roadmap::{parse_roadmap, strip_code_fences, ResourceType, RoadmapRequest, SkillLevel, ViolationKind};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROADMAP: &str = r#"{"sections":[{"title":"Basics","description":"Language fundamentals","topics":[{"title":"Syntax","description":"Core syntax","resources":[{"title":"Go by Example","url":"gobyexample.com","type":"video","description":"Annotated examples"}]}]}]}"#;

fn generate_path() -> String {
    format!("/models/{ROADMAP_MODEL}:generateContent")
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 200, "candidatesTokenCount": 80 }
    }))
}

async fn generator(server: &MockServer) -> RoadmapGenerator {
    let backend = GeminiBackend::new(server.uri(), ROADMAP_MODEL, "test-key").unwrap();
    RoadmapGenerator::new(Arc::new(backend))
}

fn request() -> RoadmapRequest {
    RoadmapRequest::new("Learn Go", SkillLevel::Beginner)
        .with_weekly_hours(5)
        .with_learning_style("video")
}

// =============================================================================
// Wire
// =============================================================================

#[tokio::test]
async fn test_generation_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(body_partial_json(json!({
            "generationConfig": {
                "topK": 40,
                "maxOutputTokens": 8192
            }
        })))
        .respond_with(reply(&format!("```json\n{ROADMAP}\n```")))
        .expect(1)
        .mount(&server)
        .await;

    let generation = generator(&server).await.generate_detailed(&request()).await.unwrap();

    assert_eq!(generation.content.section_count(), 1);
    assert_eq!(generation.content.resource_count(), 1);
    assert!(generation.normalizations.is_empty());
    assert_eq!(generation.usage.total(), 280);

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Learn Go"));
    assert!(prompt.contains("beginner"));
    assert!(prompt.contains("video"));
}

#[tokio::test]
async fn test_server_error_is_service_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let err = generator(&server).await.generate(&request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Service(_)));
    assert_eq!(err.to_string(), "Failed to generate roadmap. Please try again.");
}

#[tokio::test]
async fn test_safety_stop_is_service_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = generator(&server).await.generate(&request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Service(_)));
    assert_eq!(err.to_string(), "Failed to generate roadmap. Please try again.");
}

#[tokio::test]
async fn test_prose_reply_is_format_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(reply("Here is a roadmap for learning Go: start with the tour."))
        .mount(&server)
        .await;

    let err = generator(&server).await.generate(&request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Format(_)));
    assert_eq!(err.to_string(), "Failed to generate valid roadmap structure");
}

#[tokio::test]
async fn test_unknown_resource_type_normalized() {
    let server = MockServer::start().await;
    let podcast = ROADMAP.replace(r#""type":"video""#, r#""type":"podcast""#);
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(reply(&podcast))
        .mount(&server)
        .await;

    let generation = generator(&server).await.generate_detailed(&request()).await.unwrap();
    let resource = &generation.content.sections[0].topics[0].resources[0];
    assert_eq!(resource.resource_type, ResourceType::Article);
    assert_eq!(generation.normalizations.len(), 1);
    assert_eq!(generation.normalizations[0].original, "podcast");
}

// =============================================================================
// Parsing properties
// =============================================================================

#[test]
fn test_fence_stripping_idempotent() {
    let fenced = format!("```json\n{ROADMAP}\n```");
    let once = strip_code_fences(&fenced);
    assert_eq!(strip_code_fences(&once), once);
    assert_eq!(
        parse_roadmap(&fenced).unwrap().content,
        parse_roadmap(ROADMAP).unwrap().content
    );
}

#[test]
fn test_structural_failures() {
    let missing = parse_roadmap(r#"{"roadmap": []}"#).unwrap_err();
    assert_eq!(missing.violations()[0].path, "sections");
    assert_eq!(missing.violations()[0].kind, ViolationKind::Missing);

    let empty = parse_roadmap(r#"{"sections": []}"#).unwrap_err();
    assert_eq!(empty.violations()[0].kind, ViolationKind::Empty);

    let no_resources = ROADMAP.replace(
        r#""resources":[{"title":"Go by Example","url":"gobyexample.com","type":"video","description":"Annotated examples"}]"#,
        r#""resources":[]"#,
    );
    let err = parse_roadmap(&no_resources).unwrap_err();
    assert_eq!(err.violations()[0].path, "sections[0].topics[0].resources");
}
