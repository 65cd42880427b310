//! Mock HTTP server setup for integration tests

use merlin::MerlinClient;
use mockito::{Matcher, Mock, Server, ServerGuard};

pub const TEST_API_KEY: &str = "sk-test-123";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Client pointed at the mock server with a test key.
    pub fn client(&self) -> MerlinClient {
        MerlinClient::builder()
            .base_url(&self.base_url)
            .api_key(TEST_API_KEY)
            .build()
            .unwrap()
    }

    /// JSON reply, requiring the bearer token.
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .match_header("authorization", format!("Bearer {}", TEST_API_KEY).as_str())
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// SSE reply. Each frame is sent with its `event:` line, as the real service does.
    pub async fn mock_sse_stream(&mut self, path: &str, frames: &[&str]) -> Mock {
        let body = frames
            .iter()
            .map(|frame| {
                if *frame == "[DONE]" {
                    return "data: [DONE]\n\n".to_string();
                }
                let event_type = serde_json::from_str::<serde_json::Value>(frame)
                    .ok()
                    .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from))
                    .unwrap_or_default();
                format!("event: {}\ndata: {}\n\n", event_type, frame)
            })
            .collect::<String>();

        self.server
            .mock("POST", path)
            .match_header("accept", "text/event-stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }

    /// Error reply in the service's `{"error": {...}}` envelope.
    pub async fn mock_error(&mut self, method: &str, path: &str, status: usize, code: &str, message: &str) -> Mock {
        let body = serde_json::json!({
            "error": {"message": message, "type": "invalid_request_error", "code": code}
        });
        self.server
            .mock(method, path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_header("x-request-id", "req_123")
            .with_body(body.to_string())
            .create_async()
            .await
    }
}
