//! Mapping of pipeline errors onto HTTP responses.

use crate::error::ProfRagError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

/// Body of every 500 response. Upstream details stay in the server log.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Error returned by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body is not a usable conversation.
    BadRequest(String),
    /// Anything that went wrong before the response started streaming.
    Internal(ProfRagError),
}

impl From<ProfRagError> for ApiError {
    fn from(err: ProfRagError) -> Self {
        match err {
            ProfRagError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Internal(err) => {
                error!("Error processing request: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR).into_response()
            }
        }
    }
}
