use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use gekko_core::Persona;
use utoipa::OpenApi;

use crate::entities::ChatRole;
use crate::error::ServerError;
use crate::routes::conversations::record;
use crate::schemas::chatbot::{ChatbotRequest, ChatbotResponse, RouteStatus};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(ask, route_status),
    components(schemas(ChatbotRequest, ChatbotResponse, RouteStatus))
)]
pub struct ChatbotApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chatbot", post(ask).get(route_status))
}

/// Answer a question about public companies.
///
/// With `conversationId`, the question and the reply (or the error message)
/// are appended to that conversation.
#[utoipa::path(
    post,
    path = "/api/chatbot",
    tag = "chatbot",
    request_body = ChatbotRequest,
    responses(
        (status = 200, description = "Question answered", body = ChatbotResponse),
        (status = 400, description = "Empty question or malformed body"),
        (status = 404, description = "No companies or no data found"),
        (status = 422, description = "No financial metric identified"),
        (status = 502, description = "Model or data provider failure"),
    )
)]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatbotRequest>,
) -> Result<Json<ChatbotResponse>, ServerError> {
    let persona = Persona::from_flag(req.is_gekko);
    let conversation = req
        .conversation_id
        .filter(|_| !req.question.trim().is_empty());

    if let Some(id) = conversation {
        record(&state, id, ChatRole::User, &req.question).await?;
    }

    let (reply, outcome) = match state.assistant.answer(&req.question, persona).await {
        Ok(answer) => (answer.summary.clone(), Ok(ChatbotResponse::from(answer))),
        Err(source) => {
            let message = state.assistant.explain(&source, persona).await;
            (message.clone(), Err(ServerError::Answer { source, message }))
        }
    };

    if let Some(id) = conversation {
        record(&state, id, ChatRole::Assistant, &reply).await?;
    }

    outcome.map(Json)
}

/// Liveness probe for the chatbot route.
#[utoipa::path(
    get,
    path = "/api/chatbot",
    tag = "chatbot",
    responses((status = 200, description = "Route is up", body = RouteStatus))
)]
pub async fn route_status() -> Json<RouteStatus> {
    Json(RouteStatus {
        message: "Route is working!".to_owned(),
    })
}
