//! Integration tests for streaming responses

use crate::mock_server::MockServerFixture;
use futures::StreamExt;
use merlin::streaming::EventGroup;
use merlin::{CreateResponseRequest, Error, StreamEvent};

#[tokio::test]
async fn text_stream_decodes_end_to_end() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_sse_stream(
            "/v1/responses",
            &[
                r#"{"type":"response.created","sequence_number":0,"response":{"id":"resp_1","status":"in_progress","model":"gpt-4.1","created_at":1}}"#,
                r#"{"type":"response.output_text.delta","sequence_number":1,"item_id":"msg_1","output_index":0,"content_index":0,"delta":"Hel"}"#,
                r#"{"type":"response.output_text.delta","sequence_number":2,"item_id":"msg_1","output_index":0,"content_index":0,"delta":"lo ✓"}"#,
                r#"{"type":"response.completed","sequence_number":3,"response":{"id":"resp_1","status":"completed","model":"gpt-4.1","created_at":1}}"#,
                "[DONE]",
            ],
        )
        .await;

    let request = CreateResponseRequest::new("gpt-4.1", "hi");
    let stream = fixture.client().responses().create_stream(&request).await.unwrap();
    let acc = stream.accumulate().await.unwrap();

    mock.assert_async().await;
    assert_eq!(acc.output_text(), "Hello ✓");
    assert_eq!(acc.terminal_type(), Some("response.completed"));
    assert_eq!(acc.response().unwrap().id, "resp_1");
    assert_eq!(acc.event_count(), 4);
}

#[tokio::test]
async fn stream_request_forces_stream_flag() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/v1/responses")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4.1",
            "stream": true,
            "store": false
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("data: {\"type\":\"response.completed\"}\n\n")
        .create_async()
        .await;

    let request = CreateResponseRequest::new("gpt-4.1", "hi")
        .extra("stream", serde_json::json!(false))
        .extra("store", serde_json::json!(false));
    let events: Vec<StreamEvent> = fixture
        .client()
        .responses()
        .create_stream(&request)
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;

    mock.assert_async().await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn error_event_ends_the_stream() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_sse_stream(
            "/v1/responses",
            &[
                r#"{"type":"response.created","sequence_number":0,"response":{"id":"resp_1","status":"in_progress"}}"#,
                r#"{"type":"error","sequence_number":1,"code":"server_error","message":"The server had an error","param":null}"#,
                r#"{"type":"response.output_text.delta","sequence_number":2,"delta":"never seen"}"#,
            ],
        )
        .await;

    let events: Vec<StreamEvent> = fixture
        .client()
        .responses()
        .create_stream(&CreateResponseRequest::new("gpt-4.1", "hi"))
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    let last = &events[1];
    assert!(last.is_error() && last.is_terminal());
    assert_eq!(last.error_code.as_deref(), Some("server_error"));
    assert_eq!(last.error_message.as_deref(), Some("The server had an error"));
    assert!(last.error_param.is_none());
}

#[tokio::test]
async fn unknown_and_tool_events_pass_through() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_sse_stream(
            "/v1/responses",
            &[
                r#"{"type":"response.web_search_call.searching","sequence_number":0,"item_id":"ws_1","output_index":0}"#,
                r#"{"type":"response.brand_new.thing","sequence_number":1,"payload":{"a":1}}"#,
                r#"{"type":"response.incomplete","sequence_number":2,"response":{"id":"resp_1","status":"incomplete"}}"#,
            ],
        )
        .await;

    let events: Vec<StreamEvent> = fixture
        .client()
        .responses()
        .create_stream(&CreateResponseRequest::new("gpt-4.1", "hi"))
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].group(), EventGroup::WebSearch);
    assert!(!events[1].is_known());
    assert_eq!(events[1].raw["payload"]["a"], 1);
    assert!(events[2].is_terminal());
}

#[tokio::test]
async fn rejected_stream_request_is_remote_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error("POST", "/v1/responses", 429, "rate_limit_exceeded", "slow down")
        .await;

    let err = fixture
        .client()
        .responses()
        .create_stream(&CreateResponseRequest::new("gpt-4.1", "hi"))
        .await
        .err()
        .unwrap();

    match err {
        Error::Remote {
            status,
            code,
            request_id,
            ..
        } => {
            assert_eq!(status, 429);
            assert_eq!(code.as_deref(), Some("rate_limit_exceeded"));
            assert_eq!(request_id.as_deref(), Some("req_123"));
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}
