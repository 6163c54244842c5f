use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::routes::json_response;

/// Failures surfaced to HTTP clients as `{"error": "..."}` bodies.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Missing required URL.")]
    MissingUrl,

    #[error("Error compiling JSON.")]
    Serialization(#[source] serde_json::Error),
}

impl WebError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingUrl => StatusCode::BAD_REQUEST,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() }).to_string();
        json_response(self.status(), body)
    }
}
