//! Error types for profrag.

use thiserror::Error;

/// Library-level error type for profrag operations.
#[derive(Error, Debug)]
pub enum ProfRagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Pinecone API error ({status}): {body}")]
    Pinecone { status: u16, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for profrag operations.
pub type Result<T> = std::result::Result<T, ProfRagError>;
