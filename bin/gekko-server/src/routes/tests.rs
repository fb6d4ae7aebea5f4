use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use gekko_core::testing::{ScriptedModel, StubData};
use gekko_core::{Assistant, PipelineSettings, Quarter, prompts};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing_test::traced_test;

use super::build;
use crate::config::Config;
use crate::entities::SqliteStore;
use crate::middleware::trace::X_TRACE_ID;
use crate::state::{AppState, ConversationRegistry};

const USER: &str = "gordon@gekko.example";

async fn app(llm: ScriptedModel, data: StubData, vars: &[(&str, &str)]) -> Router {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::from_lookup(|key| vars.get(key).cloned());
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    let assistant = Assistant::new(Arc::new(llm), Arc::new(data), PipelineSettings::immediate());
    build(Arc::new(AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        assistant,
        conversations: Arc::new(ConversationRegistry::default()),
    }))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn as_user(mut req: Request<Body>) -> Request<Body> {
    req.headers_mut().insert("x-user-email", USER.parse().unwrap());
    req
}

fn ask(question: &str) -> Request<Body> {
    json_request("POST", "/api/chatbot", json!({ "question": question }))
}

#[tokio::test]
async fn health_and_route_status() {
    let app = app(ScriptedModel::new(), StubData::new(), &[]).await;

    let res = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(X_TRACE_ID));

    send(&app, json_request("POST", "/api/conversations", json!({}))).await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["liveConversations"], 1);

    let (status, body) = send(&app, get("/api/chatbot")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Route is working!" }));
}

#[tokio::test]
async fn incoming_trace_id_is_echoed() {
    let app = app(ScriptedModel::new(), StubData::new(), &[]).await;
    let trace_id = "3f2b8c1e-4d5a-4f6b-9c7d-8e9f0a1b2c3d";
    let mut req = get("/health");
    req.headers_mut().insert(X_TRACE_ID, trace_id.parse().unwrap());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.headers()[X_TRACE_ID], trace_id);
}

#[tokio::test]
async fn empty_question_is_a_bad_request() {
    let app = app(ScriptedModel::new(), StubData::new(), &[]).await;

    let (status, body) = send(&app, ask("  ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You need to ask me a question");

    let (status, _) = send(&app, json_request("POST", "/api/chatbot", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = app(ScriptedModel::new(), StubData::new(), &[]).await;
    let req = Request::post("/api/chatbot")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"question\": "))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[traced_test]
async fn unknown_company_in_gekko_voice() {
    let llm = ScriptedModel::new()
        .on(prompts::CLASSIFY_QUERY, "earnings_call")
        .on(prompts::EXTRACT_COMPANIES, "[]")
        .on(prompts::GEKKO_RESTYLE, "Give me a real company, pal.");
    let app = app(llm, StubData::new(), &[]).await;

    let req = json_request(
        "POST",
        "/api/chatbot",
        json!({ "question": "What did Blorptech say?", "isGekko": true }),
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Give me a real company, pal.");
    assert!(logs_contain("question not answered"));
}

#[tokio::test]
async fn earnings_call_answer() {
    let llm = ScriptedModel::new()
        .on(prompts::CLASSIFY_QUERY, "earnings_call")
        .on(prompts::EXTRACT_COMPANIES, r#"[{"name":"Apple","symbol":"AAPL"}]"#)
        .on(prompts::EARNINGS_CALL_WINDOW, r#"{"year":2023,"quarter":"Q4","multiple":false}"#)
        .on(prompts::SUMMARIZE_TRANSCRIPT, "Services revenue hit a record.");
    let data = StubData::new().with_transcript("AAPL", 2023, Quarter::Q4, "Tim: services grew.");
    let app = app(llm, data, &[]).await;

    let (status, body) = send(&app, ask("What did Tim Cook say in Q4 2023?")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "queryType": "earnings_call",
            "summary": "**Apple**: Services revenue hit a record."
        })
    );
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway() {
    let llm = ScriptedModel::new().fail_on(prompts::CLASSIFY_QUERY);
    let app = app(llm, StubData::new(), &[]).await;

    let (status, body) = send(&app, ask("Apple revenue?")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        "The language model is unavailable right now. Please try again shortly."
    );
}

#[tokio::test]
async fn api_token_guards_api_routes_only() {
    let app = app(ScriptedModel::new(), StubData::new(), &[("GEKKO_API_TOKEN", "s3cret")]).await;

    let (status, body) = send(&app, get("/api/chatbot")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorised");

    let mut req = get("/api/chatbot");
    req.headers_mut()
        .insert(header::AUTHORIZATION, "Bearer s3cret".parse().unwrap());
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app(ScriptedModel::new(), StubData::new(), &[]).await;
    let (status, body) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/chatbot"].is_object());
    assert!(body["paths"]["/api/chats/{id}/load"].is_object());

    let app = self::app(
        ScriptedModel::new(),
        StubData::new(),
        &[("GEKKO_ENABLE_SWAGGER", "false")],
    )
    .await;
    let (status, _) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn chit_chat() -> ScriptedModel {
    ScriptedModel::new()
        .on(prompts::CLASSIFY_QUERY, "other")
        .on(prompts::GENERIC_ANSWER, "Markets are open.")
}

async fn ask_in(app: &Router, conversation: &Value, question: &str) {
    let req = json_request(
        "POST",
        "/api/chatbot",
        json!({ "question": question, "conversationId": conversation }),
    );
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn conversation_is_saved_at_threshold_and_reloadable() {
    let app = app(chit_chat(), StubData::new(), &[]).await;

    let (status, created) = send(&app, as_user(json_request("POST", "/api/conversations", json!({})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["chatId"], Value::Null);
    let id = created["id"].clone();

    ask_in(&app, &id, "first question").await;
    let (_, chats) = send(&app, as_user(get("/api/chats"))).await;
    assert_eq!(chats, json!([]));

    ask_in(&app, &id, "second question").await;
    let (_, conversation) = send(&app, get(&format!("/api/conversations/{}", id.as_str().unwrap()))).await;
    let chat_id = conversation["chatId"].clone();
    assert!(chat_id.is_string());
    assert_eq!(conversation["messages"][1]["role"], "assistant");
    assert_eq!(conversation["messages"][1]["content"], "Markets are open.");

    let (status, chats) = send(&app, as_user(get("/api/chats"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chats.as_array().unwrap().len(), 1);
    assert_eq!(chats[0]["id"], chat_id);
    assert_eq!(chats[0]["name"], "first question");
    assert_eq!(chats[0]["messages"].as_array().unwrap().len(), 4);

    let load = format!("/api/chats/{}/load", chat_id.as_str().unwrap());
    let (status, loaded) = send(&app, as_user(json_request("POST", &load, json!({})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["chatId"], chat_id);
    assert_ne!(loaded["id"], id);

    let edit = format!("/api/conversations/{}/last-message", loaded["id"].as_str().unwrap());
    let (status, edited) = send(&app, json_request("PUT", &edit, json!({ "content": "Edited." }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["messages"][3]["content"], "Edited.");

    let (_, chats) = send(&app, as_user(get("/api/chats"))).await;
    assert_eq!(chats[0]["messages"][3]["content"], "Edited.");
}

#[tokio::test]
async fn anonymous_conversations_are_not_saved() {
    let app = app(chit_chat(), StubData::new(), &[]).await;
    let (_, created) = send(&app, json_request("POST", "/api/conversations", json!({}))).await;
    let id = created["id"].clone();
    ask_in(&app, &id, "one").await;
    ask_in(&app, &id, "two").await;

    let (status, body) = send(&app, get("/api/chats")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorised");

    let (_, chats) = send(&app, as_user(get("/api/chats"))).await;
    assert_eq!(chats, json!([]));
}

#[tokio::test]
async fn clearing_and_unknown_conversations() {
    let app = app(chit_chat(), StubData::new(), &[]).await;
    let (_, created) = send(&app, json_request("POST", "/api/conversations", json!({}))).await;
    let id = created["id"].clone();
    ask_in(&app, &id, "hello").await;

    let uri = format!("/api/conversations/{}", id.as_str().unwrap());
    let req = Request::delete(uri.as_str()).body(Body::empty()).unwrap();
    let (status, cleared) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["messages"], json!([]));

    let missing = "/api/conversations/00000000-0000-4000-8000-000000000000";
    let (status, body) = send(&app, get(missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let req = json_request(
        "POST",
        "/api/chatbot",
        json!({ "question": "hi", "conversationId": "00000000-0000-4000-8000-000000000000" }),
    );
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = as_user(json_request(
        "POST",
        "/api/chats/00000000-0000-4000-8000-000000000000/load",
        json!({}),
    ));
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn closed_conversation_is_gone() {
    let app = app(chit_chat(), StubData::new(), &[]).await;
    let (_, created) = send(&app, json_request("POST", "/api/conversations", json!({}))).await;
    let id = created["id"].as_str().unwrap().to_owned();
    ask_in(&app, &created["id"], "hello").await;

    let close = format!("/api/conversations/{id}/close");
    let (status, _) = send(&app, json_request("POST", &close, json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/conversations/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, json_request("POST", &close, json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
