//! profrag - retrieval-augmented chat over professor reviews
//!
//! A small HTTP service that answers student questions about professors by
//! grounding a chat model in reviews retrieved from a hosted vector index.
//!
//! # Overview
//!
//! For every `POST /api/chat` request the service:
//! - embeds the last message of the conversation
//! - queries the Pinecone index for the five nearest reviews
//! - appends those reviews to the question
//! - streams the chat model's answer back as plain text
//!
//! # Architecture
//!
//! - `config` - Settings file and prompt templates
//! - `embedding` - Embedding generation
//! - `vector_index` - Hosted vector index client
//! - `generation` - Streaming chat completions
//! - `rag` - Retrieval, prompt augmentation and answer streaming
//! - `server` - HTTP router and handlers
//! - `ingest` - Loading reviews into the index
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use profrag::config::Settings;
//! use profrag::rag::ChatMessage;
//! use profrag::server::AppState;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let state = AppState::from_settings(&Settings::load()?)?;
//!     let conversation = vec![ChatMessage::user("Who teaches algorithms well?")];
//!
//!     let mut answer = state.pipeline.answer(&conversation).await?;
//!     while let Some(delta) = answer.next().await {
//!         print!("{}", delta?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod openai;
pub mod rag;
pub mod server;
pub mod vector_index;

#[cfg(test)]
mod testing;

pub use error::{ProfRagError, Result};
