//! RAG (Retrieval-Augmented Generation) over professor reviews.
//!
//! The latest question is embedded, the closest reviews are fetched from the
//! vector index and appended to it, and the model's answer is streamed back.

pub mod context;
mod message;
mod pipeline;

pub use context::ContextBuilder;
pub use message::{parse_conversation, ChatMessage, Role};
pub use pipeline::RagPipeline;
