//! Text generation through a streaming chat model.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use crate::rag::ChatMessage;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Incremental text deltas produced by a chat model, in arrival order.
pub type TextStream = BoxStream<'static, Result<String>>;

/// Trait for chat models that stream their output.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Start a streamed completion for `messages`.
    ///
    /// The returned stream yields only non-empty deltas.
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TextStream>;
}
