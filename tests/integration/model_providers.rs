//! Integration tests for model provider construction and the HTTP request path

use crate::integration::test_utils::{tokyo_itinerary_json, tokyo_request, StubServer};
use itinera::config::{ItineraConfig, ProviderType};
use itinera::error::FailureKind;
use itinera::provider::{ModelProvider, ProviderFactory};
use itinera::types::{ChatExchange, ChatTurn};
use itinera::Pipeline;

#[test]
fn test_openai_provider_client() {
    let provider = ModelProvider::OpenAI {
        model: "gpt-4o".to_string(),
        api_key: "test-key".to_string(),
        base_url: None,
    };
    let client = ProviderFactory::create_client(&provider).unwrap();
    assert_eq!(client.provider_name(), "openai");
    assert_eq!(client.model_name(), "gpt-4o");
}

#[test]
fn test_anthropic_provider_client() {
    let provider = ModelProvider::Anthropic {
        model: "claude-3-5-sonnet-latest".to_string(),
        api_key: "test-key".to_string(),
    };
    let client = ProviderFactory::create_client(&provider).unwrap();
    assert_eq!(client.provider_name(), "anthropic");
    assert_eq!(client.model_name(), "claude-3-5-sonnet-latest");
}

#[test]
fn test_ollama_provider_client() {
    let provider = ModelProvider::Ollama {
        model: "llama3".to_string(),
        base_url: None,
    };
    let client = ProviderFactory::create_client(&provider).unwrap();
    assert_eq!(client.provider_name(), "ollama");
    assert_eq!(client.model_name(), "llama3");
}

#[test]
fn test_openai_without_key_is_not_configured() {
    let mut config = ItineraConfig::default();
    config.provider.api_key_env = Some("ITINERA_TEST_KEY_THAT_IS_NEVER_SET".to_string());
    assert!(Pipeline::from_config(&config).is_err());
}

fn local_config(endpoint: &str) -> ItineraConfig {
    let mut config = ItineraConfig::default();
    config.provider.provider_type = ProviderType::LocalCustom;
    config.provider.model = "stub-model".to_string();
    config.provider.endpoint = Some(endpoint.to_string());
    config
}

#[tokio::test]
async fn test_chat_reply_over_http_sends_schema_constraint() {
    let server = StubServer::start(r#"{"reply": "Take the Yamanote line."}"#, 1);
    let pipeline = Pipeline::from_config(&local_config(&server.endpoint)).unwrap();
    assert_eq!(pipeline.provider_name(), "local");

    let reply = pipeline
        .generate_chat_reply(&ChatExchange {
            conversation: vec![ChatTurn::user("How do I get around?")],
        })
        .await
        .unwrap();
    assert_eq!(reply.reply, "Take the Yamanote line.");

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&requests[0]).unwrap();
    assert_eq!(body["model"], "stub-model");
    assert_eq!(body["stream"], false);
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "chat_reply");
    assert_eq!(
        body["response_format"]["json_schema"]["schema"]["additionalProperties"],
        false
    );
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
}

#[tokio::test]
async fn test_itinerary_over_http_resolves_references() {
    let server = StubServer::start(&tokyo_itinerary_json().to_string(), 1);
    let pipeline = Pipeline::from_config(&local_config(&server.endpoint)).unwrap();
    let request = tokyo_request();

    let response = pipeline.generate_itinerary(&request).await.unwrap();
    assert_eq!(response.sections.len(), 2);
    assert_eq!(response.sections[0].activities[1], request.activities[2]);
    server.finish();
}

#[tokio::test]
async fn test_non_json_content_over_http_is_malformed() {
    let server = StubServer::start("I would love to help, but...", 1);
    let pipeline = Pipeline::from_config(&local_config(&server.endpoint)).unwrap();

    let err = pipeline.generate_activities("Lisbon").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::MalformedOutput);
    server.finish();
}
