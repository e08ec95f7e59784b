use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tf_core::{ReadingDifficulty, Sentiment};
use tf_inference::prelude::*;
use tf_inference::prompt::TOOL_NAME;

fn analysis_json() -> Value {
    json!({
        "author": null,
        "topic": "Space exploration",
        "summary": "A probe reached Europa.",
        "reading_difficulty": "medium",
        "estimated_reading_time_minutes": 3,
        "entities": [
            { "entity_type": "organization", "entity": "NASA", "sentiment": "positive" }
        ]
    })
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn anthropic_messages(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers.get("x-api-key").map(|v| v == "test-key").unwrap_or(false)
        && headers.get("anthropic-version").is_some();
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    assert!(prompt.starts_with("Analyze this text: "));
    (
        StatusCode::OK,
        Json(json!({
            "content": [
                { "type": "tool_use", "id": "toolu_1", "name": TOOL_NAME, "input": analysis_json() }
            ]
        })),
    )
}

async fn openai_completions(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").map(|v| v != "Bearer test-key").unwrap_or(true) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": TOOL_NAME, "arguments": analysis_json().to_string() }
                    }]
                }
            }]
        })),
    )
}

fn mock_backends() -> Router {
    Router::new()
        .route("/v1/messages", post(anthropic_messages))
        .route("/v1/chat/completions", post(openai_completions))
        .route(
            "/slow/v1/messages",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "content": [] }))
            }),
        )
}

#[tokio::test]
async fn test_anthropic_round_trip() {
    let addr = serve(mock_backends()).await;
    let analyzer = AnthropicAnalyzer::new("test-key".to_string(), "claude".to_string(), None)
        .unwrap()
        .with_base_url(format!("http://{}", addr));

    let analysis = analyzer.analyze("Europa probe article text.").await.unwrap();

    assert_eq!(analysis.topic, "Space exploration");
    assert_eq!(analysis.reading_difficulty, ReadingDifficulty::Medium);
    assert_eq!(analysis.entities[0].sentiment, Sentiment::Positive);
}

#[tokio::test]
async fn test_anthropic_rejected_key_is_error() {
    let addr = serve(mock_backends()).await;
    let analyzer = AnthropicAnalyzer::new("wrong".to_string(), "claude".to_string(), None)
        .unwrap()
        .with_base_url(format!("http://{}", addr));

    assert!(analyzer.analyze("Europa probe article text.").await.is_err());
}

#[tokio::test]
async fn test_openai_round_trip() {
    let addr = serve(mock_backends()).await;
    let analyzer = OpenAiAnalyzer::new("test-key".to_string(), "gpt-4o-mini".to_string(), None)
        .unwrap()
        .with_base_url(format!("http://{}/", addr));

    let analysis = analyzer.analyze("Europa probe article text.").await.unwrap();

    assert_eq!(analysis.estimated_reading_time_minutes, 3);
    assert_eq!(analysis.entities[0].entity, "NASA");
}

#[tokio::test]
async fn test_blank_text_skips_backend() {
    let analyzer = OpenAiAnalyzer::new("test-key".to_string(), "gpt-4o-mini".to_string(), None)
        .unwrap()
        .with_base_url("http://127.0.0.1:9");

    assert!(matches!(analyzer.analyze("  \n").await, Err(Error::Inference(_))));
}

#[tokio::test]
async fn test_optional_timeout_applies() {
    let addr = serve(mock_backends()).await;
    let analyzer = AnthropicAnalyzer::new(
        "test-key".to_string(),
        "claude".to_string(),
        Some(Duration::from_millis(200)),
    )
    .unwrap()
    .with_base_url(format!("http://{}/slow", addr));

    assert!(analyzer.analyze("Europa probe article text.").await.is_err());
}
