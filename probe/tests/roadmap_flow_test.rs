//! Roadmap creation integration tests
//!
//! Drives the creation screens against in-memory auth and storage:
//! - AI roadmap generated, stored and opened
//! - Remaining counts spent only on success
//! - Concurrent submissions rejected while one is in flight
//! - Custom roadmaps stored with placeholder content

mod common;

use std::sync::Arc;

use common::{go_request, Fixture, GatedBackend, GO_ROADMAP};
use probe::screens::{CreateAiRoadmapScreen, CreateCustomRoadmapScreen, CUSTOM_PLACEHOLDER};
use probe::{AppError, Level, Route};
use probe_agent::backend::MockBackend;
use probe_agent::{GenerationError, RoadmapGenerator};
use probe_store::{Collection, RoadmapBody, RoadmapKind};
use roadmap::{RoadmapRequest, SkillLevel};

fn generator(response: &str) -> (Arc<MockBackend>, Arc<RoadmapGenerator>) {
    let backend = Arc::new(MockBackend::default().with_response(response));
    let generator = Arc::new(RoadmapGenerator::new(backend.clone()));
    (backend, generator)
}

// =============================================================================
// AI roadmaps
// =============================================================================

#[tokio::test]
async fn test_ai_roadmap_created_and_opened() {
    let fx = Fixture::new();
    let user = fx.user("ada@example.com", 3, 5, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    let mut notes = ctx.toaster.subscribe();
    let (backend, generator) = generator(GO_ROADMAP);

    let created = CreateAiRoadmapScreen::new(ctx.clone(), generator)
        .submit(&go_request())
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(created.navigate, Route::Roadmap(created.roadmap.id.clone()));
    assert_eq!(created.roadmap.kind, RoadmapKind::Ai);
    assert_eq!(created.roadmap.user_id, user.id);
    assert_eq!(created.roadmap.request.title, "Learn Go");

    let content = created.roadmap.content.as_tree().unwrap();
    assert_eq!(content.sections[0].title, "Basics");
    assert_eq!(content.sections[0].topics[0].resources[0].url, "gobyexample.com");

    assert_eq!(fx.remaining(&user.id, "ai_roadmaps_remaining"), 2);
    assert_eq!(fx.remaining(&user.id, "custom_roadmaps_remaining"), 5);

    let note = notes.recv().await.unwrap();
    assert_eq!(note.level, Level::Success);
    assert_eq!(note.message, "AI roadmap created successfully!");

    // The cached identity follows the new count.
    let profile = ctx.session.identity().unwrap().profile().cloned().unwrap();
    assert_eq!(profile.ai_roadmaps_remaining, 2);
}

#[tokio::test]
async fn test_fenced_model_output_accepted() {
    let fx = Fixture::new();
    fx.user("ada@example.com", 1, 1, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    let (_, generator) = generator(&format!("```json\n{GO_ROADMAP}\n```"));

    let created = CreateAiRoadmapScreen::new(ctx, generator)
        .submit(&go_request())
        .await
        .unwrap();
    assert_eq!(created.roadmap.content.as_tree().unwrap().section_count(), 1);
}

#[tokio::test]
async fn test_no_ai_roadmaps_remaining() {
    let fx = Fixture::new();
    fx.user("ada@example.com", 0, 5, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    let mut notes = ctx.toaster.subscribe();
    let (backend, generator) = generator(GO_ROADMAP);

    let err = CreateAiRoadmapScreen::new(ctx, generator)
        .submit(&go_request())
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "No AI roadmaps remaining");
    assert_eq!(backend.call_count(), 0);
    assert!(fx.store.rows(Collection::Roadmaps).is_empty());

    let note = notes.recv().await.unwrap();
    assert_eq!(note.level, Level::Error);
    assert_eq!(note.message, "No AI roadmaps remaining");
}

#[tokio::test]
async fn test_invalid_model_output_spends_nothing() {
    let fx = Fixture::new();
    let user = fx.user("ada@example.com", 3, 5, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    let mut notes = ctx.toaster.subscribe();
    let (_, generator) = generator(r#"{"sections": []}"#);

    let err = CreateAiRoadmapScreen::new(ctx, generator)
        .submit(&go_request())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Generation(GenerationError::Format(_))));
    assert_eq!(fx.remaining(&user.id, "ai_roadmaps_remaining"), 3);
    assert!(fx.store.rows(Collection::Roadmaps).is_empty());
    assert_eq!(
        notes.recv().await.unwrap().message,
        "Failed to generate valid roadmap structure"
    );
}

#[tokio::test]
async fn test_unavailable_service() {
    let fx = Fixture::new();
    let user = fx.user("ada@example.com", 3, 5, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    let backend = Arc::new(MockBackend::default().with_available(false));
    let generator = Arc::new(RoadmapGenerator::new(backend));

    let err = CreateAiRoadmapScreen::new(ctx, generator)
        .submit(&go_request())
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Failed to generate roadmap. Please try again.");
    assert_eq!(fx.remaining(&user.id, "ai_roadmaps_remaining"), 3);
}

#[tokio::test]
async fn test_signed_out_user_rejected() {
    let fx = Fixture::new();
    let ctx = fx.app().await;
    let (backend, generator) = generator(GO_ROADMAP);

    let err = CreateAiRoadmapScreen::new(ctx, generator)
        .submit(&go_request())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotSignedIn));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_service() {
    let fx = Fixture::new();
    fx.user("ada@example.com", 3, 5, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    let (backend, generator) = generator(GO_ROADMAP);

    let request = RoadmapRequest::new("Go", SkillLevel::Beginner)
        .with_weekly_hours(5)
        .with_learning_style("video");
    let err = CreateAiRoadmapScreen::new(ctx, generator)
        .submit(&request)
        .await
        .unwrap_err();

    assert_eq!(err.field_errors()[0].field, "title");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_second_submission_rejected_while_in_flight() {
    let fx = Fixture::new();
    let user = fx.user("ada@example.com", 3, 5, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    let backend = Arc::new(GatedBackend::new(GO_ROADMAP));
    let screen = CreateAiRoadmapScreen::new(ctx, Arc::new(RoadmapGenerator::new(backend.clone())));
    let request = go_request();

    let first = screen.submit(&request);
    let second = async {
        backend.entered.notified().await;
        assert!(screen.is_submitting());
        let result = screen.submit(&request).await;
        backend.release.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Busy)));
    assert_eq!(backend.call_count(), 1);
    assert!(!screen.is_submitting());
    assert_eq!(fx.remaining(&user.id, "ai_roadmaps_remaining"), 2);
    assert_eq!(fx.store.rows(Collection::Roadmaps).len(), 1);
}

#[tokio::test]
async fn test_resubmit_after_failure() {
    let fx = Fixture::new();
    fx.user("ada@example.com", 3, 5, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    fx.store.fail_collection(Collection::Roadmaps, "insert failed");
    let (backend, generator) = generator(GO_ROADMAP);
    let screen = CreateAiRoadmapScreen::new(ctx, generator);

    assert!(screen.submit(&go_request()).await.is_err());
    assert!(!screen.is_submitting());

    fx.store.heal_collection(Collection::Roadmaps);
    assert!(screen.submit(&go_request()).await.is_ok());
    assert_eq!(backend.call_count(), 2);
}

// =============================================================================
// Custom roadmaps
// =============================================================================

#[tokio::test]
async fn test_custom_roadmap_created() {
    let fx = Fixture::new();
    let user = fx.user("ada@example.com", 3, 5, "free");
    let ctx = fx.signed_in("ada@example.com").await;
    let mut notes = ctx.toaster.subscribe();

    let request = RoadmapRequest::new("Watercolour painting", SkillLevel::Intermediate)
        .with_weekly_hours(3)
        .with_learning_style("Visual")
        .with_learning_style("Project-based");
    let created = CreateCustomRoadmapScreen::new(ctx)
        .submit(&request)
        .await
        .unwrap();

    assert_eq!(created.navigate, Route::Dashboard);
    assert_eq!(created.roadmap.kind, RoadmapKind::Custom);
    assert_eq!(
        created.roadmap.content,
        RoadmapBody::Text(CUSTOM_PLACEHOLDER.to_string())
    );
    assert_eq!(fx.remaining(&user.id, "custom_roadmaps_remaining"), 4);
    assert_eq!(fx.remaining(&user.id, "ai_roadmaps_remaining"), 3);
    assert_eq!(notes.recv().await.unwrap().message, "Custom roadmap created successfully!");

    let rows = fx.store.rows(Collection::Roadmaps);
    assert_eq!(rows[0]["type"], "custom");
    assert_eq!(rows[0]["privacy"], "private");
    assert_eq!(rows[0]["time_commitment_hours"], 3);
}

#[tokio::test]
async fn test_no_custom_roadmaps_remaining() {
    let fx = Fixture::new();
    fx.user("ada@example.com", 3, 0, "free");
    let ctx = fx.signed_in("ada@example.com").await;

    let request = RoadmapRequest::new("Watercolour painting", SkillLevel::Beginner)
        .with_weekly_hours(3)
        .with_learning_style("Visual");
    let err = CreateCustomRoadmapScreen::new(ctx)
        .submit(&request)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "No custom roadmaps remaining");
    assert!(fx.store.rows(Collection::Roadmaps).is_empty());
}
