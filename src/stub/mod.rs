//! In-memory stand-in for the crèche REST api, for local development and
//! integration tests of the http client.

mod routes;
mod state;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub use routes::router;
pub use state::StubState;

#[derive(Debug, Error)]
pub enum StubError {
    #[error("Authentification requise")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{message}")]
    Injected { status: StatusCode, message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let status = match &self {
            StubError::Unauthorized => StatusCode::UNAUTHORIZED,
            StubError::NotFound(_) => StatusCode::NOT_FOUND,
            StubError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StubError::Conflict(_) => StatusCode::CONFLICT,
            StubError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StubError::Injected { status, .. } => *status,
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
