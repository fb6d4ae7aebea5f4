use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::state::AppState;

/// Header the authenticating proxy sets to the signed-in user's e-mail.
pub const X_USER_EMAIL: &str = "x-user-email";

/// Require `Authorization: Bearer <GEKKO_API_TOKEN>` when a token is configured.
pub async fn require_api_token(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(expected) = state.config.api_token.as_deref() {
        let provided = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if provided != Some(expected) {
            return ServerError::Unauthorised.into_response();
        }
    }
    next.run(req).await
}

/// The signed-in user, if the proxy identified one.
pub fn user_email(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_USER_EMAIL)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
