//! End-to-end pipeline behavior against a scripted backend

use crate::integration::test_utils::{
    activities_json, tokyo_itinerary_json, tokyo_request, ScriptedBackend,
};
use futures::future::join_all;
use itinera::config::GenerationConfig;
use itinera::error::{BackendError, FailureKind, GenerationError};
use itinera::provider::CompletionOptions;
use itinera::types::{ChatExchange, ChatTurn};
use itinera::Pipeline;
use std::sync::Arc;

fn pipeline_with(backend: Arc<ScriptedBackend>) -> Pipeline {
    Pipeline::new(backend, &GenerationConfig::default(), CompletionOptions::default())
}

#[tokio::test]
async fn test_tokyo_weekend_resolves_catalog_records() {
    let backend = Arc::new(ScriptedBackend::replying(tokyo_itinerary_json().to_string()));
    let pipeline = pipeline_with(backend.clone());
    let request = tokyo_request();

    let response = pipeline.generate_itinerary(&request).await.unwrap();

    assert_eq!(response.sections.len(), 2);
    let first = &response.sections[0];
    assert_eq!(
        first.activities,
        vec![request.activities[0].clone(), request.activities[2].clone()]
    );
    let second = &response.sections[1];
    assert_eq!(second.activities, vec![request.activities[1].clone()]);

    assert_eq!(first.trip_id, "trip-tokyo");
    assert_eq!(first.start_date, "2024-05-01T09:00:00Z");
    assert_eq!(first.end_date, "2024-05-01T20:00:00Z");
    assert_eq!(first.budget, Some(60.0));
    assert_eq!(second.budget, Some(35.5));
    assert_eq!(response.total_budget(), Some(95.5));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_one_past_the_end_reference_is_dropped_silently() {
    let mut itinerary = tokyo_itinerary_json();
    itinerary["sections"][0]["activityRefs"][1]["activityIndex"] = serde_json::json!(3);
    let backend = Arc::new(ScriptedBackend::replying(itinerary.to_string()));

    let request = tokyo_request();
    let response = pipeline_with(backend)
        .generate_itinerary(&request)
        .await
        .unwrap();

    let first = &response.sections[0];
    assert_eq!(first.activities, vec![request.activities[0].clone()]);
    assert_eq!(first.name, "Day 1: Asakusa and Shibuya");
    assert_eq!(first.budget, Some(60.0));
    assert_eq!(response.sections[1].activities.len(), 1);
}

#[tokio::test]
async fn test_negative_reference_is_dropped_silently() {
    let mut itinerary = tokyo_itinerary_json();
    itinerary["sections"][1]["activityRefs"][0]["activityIndex"] = serde_json::json!(-1);
    let backend = Arc::new(ScriptedBackend::replying(itinerary.to_string()));

    let response = pipeline_with(backend)
        .generate_itinerary(&tokyo_request())
        .await
        .unwrap();
    assert!(response.sections[1].activities.is_empty());
}

#[tokio::test]
async fn test_unusable_index_numbers_are_dropped_silently() {
    let request = tokyo_request();
    for index in [
        serde_json::json!(9_223_372_036_854_775_808u64),
        serde_json::json!(2.0),
    ] {
        let mut itinerary = tokyo_itinerary_json();
        itinerary["sections"][0]["activityRefs"][1]["activityIndex"] = index;
        let backend = Arc::new(ScriptedBackend::replying(itinerary.to_string()));

        let response = pipeline_with(backend)
            .generate_itinerary(&request)
            .await
            .unwrap();
        assert_eq!(
            response.sections[0].activities,
            vec![request.activities[0].clone()]
        );
        assert_eq!(response.sections[1].activities.len(), 1);
    }
}

#[tokio::test]
async fn test_reversed_section_dates_are_passed_through() {
    let mut itinerary = tokyo_itinerary_json();
    itinerary["sections"][0]["start_date"] = serde_json::json!("2024-05-01T18:00:00Z");
    itinerary["sections"][0]["end_date"] = serde_json::json!("2024-05-01T09:00:00Z");
    let backend = Arc::new(ScriptedBackend::replying(itinerary.to_string()));

    let response = pipeline_with(backend)
        .generate_itinerary(&tokyo_request())
        .await
        .unwrap();
    assert_eq!(response.sections[0].start_date, "2024-05-01T18:00:00Z");
    assert_eq!(response.sections[0].end_date, "2024-05-01T09:00:00Z");
}

#[tokio::test]
async fn test_extra_field_is_schema_violation_not_stripped() {
    let mut itinerary = tokyo_itinerary_json();
    itinerary["extraField"] = serde_json::json!(1);
    let backend = Arc::new(ScriptedBackend::replying(itinerary.to_string()));

    let err = pipeline_with(backend)
        .generate_itinerary(&tokyo_request())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::SchemaViolation);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_missing_required_field_is_schema_violation() {
    let mut itinerary = tokyo_itinerary_json();
    itinerary["sections"][0]
        .as_object_mut()
        .unwrap()
        .remove("description");
    let backend = Arc::new(ScriptedBackend::replying(itinerary.to_string()));

    let err = pipeline_with(backend)
        .generate_itinerary(&tokyo_request())
        .await
        .unwrap_err();
    match err {
        GenerationError::SchemaViolation {
            contract,
            diagnostics,
        } => {
            assert_eq!(contract, "itinerary");
            assert!(diagnostics
                .iter()
                .any(|d| d.path == "/sections/0" && d.message.contains("description")));
        }
        other => panic!("expected schema violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_apology_text_is_malformed_output() {
    let backend = Arc::new(ScriptedBackend::replying("Sorry, I can't help with that."));

    let err = pipeline_with(backend)
        .generate_itinerary(&tokyo_request())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::MalformedOutput);
    assert!(err.to_string().contains("Sorry, I can't help with that."));
}

#[tokio::test]
async fn test_fenced_json_is_not_repaired() {
    let fenced = format!("```json\n{}\n```", tokyo_itinerary_json());
    let backend = Arc::new(ScriptedBackend::replying(fenced));

    let err = pipeline_with(backend)
        .generate_itinerary(&tokyo_request())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::MalformedOutput);
}

#[tokio::test]
async fn test_activities_are_capped_and_carry_no_identity() {
    let backend = Arc::new(ScriptedBackend::replying(activities_json(12).to_string()));
    let response = pipeline_with(backend)
        .generate_activities("Kyoto")
        .await
        .unwrap();

    assert_eq!(response.activities.len(), 12);
    let serialized = serde_json::to_value(&response).unwrap();
    for activity in serialized["activities"].as_array().unwrap() {
        assert!(activity.get("id").is_none());
        assert!(activity.get("cityId").is_none());
    }
}

#[tokio::test]
async fn test_thirteen_activities_are_rejected() {
    let backend = Arc::new(ScriptedBackend::replying(activities_json(13).to_string()));
    let err = pipeline_with(backend)
        .generate_activities("Kyoto")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::SchemaViolation);
}

#[tokio::test]
async fn test_backend_failure_is_reported_after_one_attempt() {
    let backend = Arc::new(ScriptedBackend::failing(BackendError::RequestFailed(
        "Request timeout".to_string(),
    )));
    let err = pipeline_with(backend.clone())
        .generate_chat_reply(&ChatExchange {
            conversation: vec![ChatTurn::user("hello")],
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::BackendError);
    assert!(err.is_retryable());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_chat_prompt_carries_history_oldest_first() {
    let backend = Arc::new(ScriptedBackend::replying(r#"{"reply": "Try Yanaka."}"#));
    let mut exchange = ChatExchange::new();
    exchange.push(ChatTurn::user("Where should I walk in Tokyo?"));
    exchange.push(ChatTurn::assistant("Old neighborhoods are nice."));
    exchange.push(ChatTurn::user("Which one?"));

    let reply = pipeline_with(backend.clone())
        .generate_chat_reply(&exchange)
        .await
        .unwrap();
    assert_eq!(reply.reply, "Try Yanaka.");

    let prompt = &backend.prompts()[0];
    let first = prompt.find("user: Where should I walk").unwrap();
    let second = prompt.find("assistant: Old neighborhoods").unwrap();
    let third = prompt.find("user: Which one?").unwrap();
    assert!(first < second && second < third);
    assert_eq!(exchange.turns().len(), 3);
}

#[tokio::test]
async fn test_concurrent_invocations_are_independent() {
    let backend = Arc::new(ScriptedBackend::new(|prompt| {
        let city = prompt
            .lines()
            .next()
            .and_then(|line| line.rsplit(" in ").next())
            .unwrap_or("")
            .trim_end_matches('.')
            .to_string();
        Ok(serde_json::json!({
            "activities": [{
                "name": format!("Walk around {}", city),
                "description": null,
                "category": "other",
                "cost": null,
                "duration": null
            }]
        })
        .to_string())
    }));
    let pipeline = pipeline_with(backend.clone());
    let cities = ["Kyoto", "Osaka", "Nara", "Sapporo", "Fukuoka", "Kobe"];

    let outcomes = join_all(cities.iter().map(|city| {
        let pipeline = pipeline.clone();
        async move { pipeline.generate_activities(city).await }
    }))
    .await;

    for (city, outcome) in cities.iter().zip(outcomes) {
        let response = outcome.unwrap();
        assert_eq!(response.activities[0].name, format!("Walk around {}", city));
    }
    assert_eq!(backend.calls(), cities.len());
}

#[tokio::test]
async fn test_rendering_is_deterministic_across_invocations() {
    let backend = Arc::new(ScriptedBackend::replying(tokyo_itinerary_json().to_string()));
    let pipeline = pipeline_with(backend.clone());
    let request = tokyo_request();

    pipeline.generate_itinerary(&request).await.unwrap();
    pipeline.generate_itinerary(&request).await.unwrap();

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], prompts[1]);
    assert!(prompts[0].contains("Trip ID: trip-tokyo"));
}
