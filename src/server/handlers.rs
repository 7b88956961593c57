//! HTTP handlers.

use super::error::ApiError;
use super::AppState;
use crate::rag::parse_conversation;
use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// `POST /api/chat`: stream an answer to the conversation in the body.
///
/// A body that cannot be read, including one over the size limit, is a bad
/// request like any other malformed conversation.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let conversation = parse_conversation(&body)?;
    let stream = state.pipeline.answer(&conversation).await?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
