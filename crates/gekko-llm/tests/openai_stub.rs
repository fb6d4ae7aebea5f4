//! Drives [`OpenAiChat`] against an in-process axum stub of the provider.

use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use gekko_llm::{ChatModel, CompletionRequest, LlmError, OpenAiChat, OpenAiConfig};
use serde_json::{json, Value};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn client(base_url: String) -> OpenAiChat {
    OpenAiChat::new(OpenAiConfig {
        api_key: "test-key".into(),
        base_url,
        model: "stub-model".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn returns_first_choice_content() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["authorization"], "Bearer test-key");
            assert_eq!(body["model"], "stub-model");
            assert_eq!(body["messages"][0]["role"], "system");
            let question = body["messages"][1]["content"].as_str().unwrap_or("").to_owned();
            Json(json!({
                "choices": [ { "message": { "role": "assistant", "content": format!("echo: {question}") } } ]
            }))
        }),
    );
    let chat = client(spawn(app).await);

    let reply = chat
        .complete(CompletionRequest::instruct("be brief", "ping"))
        .await
        .unwrap();
    assert_eq!(reply, "echo: ping");
}

#[tokio::test]
async fn maps_429_to_rate_limited() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let chat = client(spawn(app).await);

    let err = chat
        .complete(CompletionRequest::instruct("s", "u"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::RateLimited));
}

#[tokio::test]
async fn surfaces_provider_error_message() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": { "message": "bad key" } })),
            )
        }),
    );
    let chat = client(spawn(app).await);

    match chat.complete(CompletionRequest::instruct("s", "u")).await {
        Err(LlmError::Provider { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "bad key");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [] })) }),
    );
    let chat = client(spawn(app).await);

    let err = chat
        .complete(CompletionRequest::instruct("s", "u"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}
