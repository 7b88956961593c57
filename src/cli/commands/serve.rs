//! HTTP chat server command.

use crate::cli::Output;
use crate::config::Settings;
use crate::server::{router, AppState};
use std::sync::Arc;
use tracing::info;

/// Run the chat server until Ctrl+C.
pub async fn run_serve(host: Option<String>, port: Option<u16>, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    if std::env::var("OPENAI_API_KEY").map_or(true, |k| k.is_empty()) {
        Output::warning("OPENAI_API_KEY is not set; chat requests will fail.");
    }
    if std::env::var("PINECONE_API_KEY").map_or(true, |k| k.is_empty()) {
        Output::warning("PINECONE_API_KEY is not set; chat requests will fail.");
    }

    let state = Arc::new(AppState::from_settings(&settings)?);
    let app = router(state, &settings.server.chat_route);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("profrag Chat Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Chat", &format!("POST {}", settings.server.chat_route));
    Output::kv("Health", "GET  /health");
    Output::kv("Index", &settings.pinecone.index_name);
    Output::kv("Model", &settings.generation.model);
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
