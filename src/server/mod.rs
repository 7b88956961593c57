//! HTTP API server.
//!
//! Exposes the streaming chat endpoint and a health check.

mod error;
mod handlers;

pub use error::{ApiError, INTERNAL_SERVER_ERROR};

use crate::config::{Prompts, Settings};
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::generation::OpenAIChatModel;
use crate::openai::create_client;
use crate::rag::RagPipeline;
use crate::vector_index::PineconeIndex;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
pub struct AppState {
    pub pipeline: RagPipeline,
}

impl AppState {
    pub fn new(pipeline: RagPipeline) -> Self {
        Self { pipeline }
    }

    /// Construct the upstream clients once for the lifetime of the server.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = create_client(&settings.openai)?;
        let embedder = Arc::new(OpenAIEmbedder::from_settings(
            client.clone(),
            &settings.embedding,
        ));
        let model = Arc::new(OpenAIChatModel::from_settings(client, &settings.generation));
        let index = Arc::new(PineconeIndex::from_env(settings.pinecone.clone())?);
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let pipeline = RagPipeline::new(index, embedder, model)
            .with_top_k(settings.retrieval.top_k)
            .with_prompts(prompts);

        Ok(Self::new(pipeline))
    }
}

/// Build the router with the chat endpoint mounted at `chat_route`.
pub fn router(state: Arc<AppState>, chat_route: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(chat_route, post(handlers::chat))
        .layer(cors)
        .with_state(state)
}
