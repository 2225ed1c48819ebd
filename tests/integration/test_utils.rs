//! Shared test utilities for integration tests
//!
//! Provides a scripted generation backend, a minimal OpenAI-compatible HTTP
//! stub and the trip fixtures used across the pipeline tests.

use async_trait::async_trait;
use itinera::error::BackendError;
use itinera::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use itinera::schema::ResponseSchema;
use itinera::types::{ActivityRecord, TripRequest};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` with exclusive access to process environment variables.
pub fn with_env_lock<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    f()
}

type Responder = dyn Fn(&str) -> Result<String, BackendError> + Send + Sync;

/// Backend whose reply is computed from the user prompt.
pub struct ScriptedBackend {
    responder: Box<Responder>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, BackendError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always reply with the same text.
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Always fail with the same backend error.
    pub fn failing(error: BackendError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedBackend {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _schema: &ResponseSchema,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt.clone());

        let content = (self.responder)(&prompt)?;
        Ok(CompletionResponse {
            content,
            model: "scripted".to_string(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// One-shot HTTP server answering every request with a canned
/// chat-completions envelope whose message content is `content`.
pub struct StubServer {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    pub fn start(content: &str, connections: usize) -> Self {
        // Requests to the stub must never be routed through a proxy.
        with_env_lock(|| {
            std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
            std::env::set_var("no_proxy", "127.0.0.1,localhost");
        });

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let body = serde_json::json!({
            "model": "stub-model",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
        })
        .to_string();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let handle = std::thread::spawn(move || {
            for stream in listener.incoming().take(connections) {
                let Ok(mut stream) = stream else { break };
                let request_body = read_request_body(&mut stream);
                seen.lock().unwrap().push(request_body);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self {
            endpoint: format!("http://127.0.0.1:{}/v1", port),
            requests,
            handle: Some(handle),
        }
    }

    /// Request bodies received so far, joining the server thread first.
    pub fn finish(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.requests.lock().unwrap().clone()
    }
}

fn read_request_body(stream: &mut std::net::TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    let _ = reader.read_exact(&mut body);
    String::from_utf8_lossy(&body).into_owned()
}

/// The three-activity Tokyo weekend used by the end-to-end tests.
pub fn tokyo_request() -> TripRequest {
    TripRequest {
        trip_id: Some("trip-tokyo".to_string()),
        name: "Tokyo Weekend".to_string(),
        description: "A short city break".to_string(),
        start_date: "2024-05-01".to_string(),
        end_date: "2024-05-02".to_string(),
        activities: vec![
            ActivityRecord::new("Senso-ji Temple", "city-tokyo").with_id("act-0"),
            ActivityRecord::new("Ramen tour", "city-tokyo").with_id("act-1"),
            ActivityRecord::new("Shibuya crossing", "city-tokyo").with_id("act-2"),
        ],
    }
}

/// Two-section itinerary for the Tokyo request: indices 0 and 2, then 1.
pub fn tokyo_itinerary_json() -> serde_json::Value {
    serde_json::json!({
        "sections": [
            {
                "tripId": "trip-tokyo",
                "name": "Day 1: Asakusa and Shibuya",
                "description": "Temple morning, crossing at dusk",
                "start_date": "2024-05-01T09:00:00Z",
                "end_date": "2024-05-01T20:00:00Z",
                "budget": 60.0,
                "activityRefs": [
                    { "activityIndex": 0, "name": "Senso-ji Temple" },
                    { "activityIndex": 2, "name": "Shibuya crossing" }
                ]
            },
            {
                "tripId": "trip-tokyo",
                "name": "Day 2: Food",
                "description": "Noodles",
                "start_date": "2024-05-02T11:00:00Z",
                "end_date": "2024-05-02T15:00:00Z",
                "budget": 35.5,
                "activityRefs": [
                    { "activityIndex": 1, "name": "Ramen tour" }
                ]
            }
        ]
    })
}

/// `count` minimal activity drafts as the model would emit them.
pub fn activities_json(count: usize) -> serde_json::Value {
    let activities: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "name": format!("Activity {}", i),
                "description": "Worth a visit",
                "category": "sightseeing",
                "cost": 10.0,
                "duration": 1.5
            })
        })
        .collect();
    serde_json::json!({ "activities": activities })
}
