//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a JSON `{"error": ...}`
//! body with a status code per kind.
//!
//! Database and internal errors are logged in full but only a generic message
//! reaches the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gekko_core::AnswerError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    /// The pipeline could not answer. `message` is what the user sees,
    /// possibly restyled by the persona.
    #[error("{source}")]
    Answer {
        source: AnswerError,
        message: String,
    },

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or wrong bearer token, or no signed-in user.
    #[error("unauthorised")]
    Unauthorised,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Answer { source, .. } => answer_status(source),
            ServerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unauthorised => StatusCode::UNAUTHORIZED,
        }
    }
}

pub fn answer_status(err: &AnswerError) -> StatusCode {
    match err {
        AnswerError::EmptyQuestion => StatusCode::BAD_REQUEST,
        AnswerError::NoCompanies | AnswerError::NoTranscripts | AnswerError::NoFinancialData => {
            StatusCode::NOT_FOUND
        }
        AnswerError::MetricNotIdentified => StatusCode::UNPROCESSABLE_ENTITY,
        AnswerError::Classification(_) | AnswerError::Llm(_) | AnswerError::Data(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let client_message = match self {
            ServerError::Answer { source, message } => {
                if status.is_server_error() {
                    error!(kind = source.kind(), error = %source, "upstream failure");
                } else {
                    warn!(kind = source.kind(), error = %source, "question not answered");
                }
                message
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                "internal server error".to_owned()
            }
            ServerError::NotFound(m) => m,
            ServerError::Unauthorised => "unauthorised".to_owned(),
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
