//! Retrieval-augmented answer generation.

use super::context::{augment_conversation, format_context_for_prompt, ContextBuilder};
use super::message::ChatMessage;
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::{ProfRagError, Result};
use crate::generation::{ChatModel, TextStream};
use crate::vector_index::VectorIndex;
use futures::{future, stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Embeds the latest question, retrieves matching reviews and streams an answer.
///
/// Holds the long-lived upstream clients; one instance serves every request.
pub struct RagPipeline {
    context_builder: ContextBuilder,
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl RagPipeline {
    /// Create a new pipeline.
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            context_builder: ContextBuilder::new(index, embedder),
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set the number of reviews retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.context_builder = self.context_builder.with_top_k(top_k);
        self
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Build the augmented message list for a conversation.
    #[instrument(skip(self, conversation), fields(messages = conversation.len()))]
    pub async fn build_messages(&self, conversation: &[ChatMessage]) -> Result<Vec<ChatMessage>> {
        let question = conversation
            .last()
            .ok_or_else(|| ProfRagError::Rag("Conversation is empty".to_string()))?;

        debug!("Processing question: {}", question.content);

        let matches = self.context_builder.build(&question.content).await?;
        let context = format_context_for_prompt(&self.prompts, &matches, self.context_builder.top_k());

        Ok(augment_conversation(
            &self.prompts.system_prompt(),
            conversation,
            &context,
        ))
    }

    /// Answer a conversation as a stream of text deltas.
    ///
    /// Every upstream failure up to and including the first generated chunk is
    /// returned as an error. Later failures end the stream after one `Err` item.
    pub async fn answer(&self, conversation: &[ChatMessage]) -> Result<TextStream> {
        let messages = self.build_messages(conversation).await?;
        let stream = self.model.stream_chat(&messages).await?;
        let stream = prime(stream).await?;
        Ok(stop_after_error(stream))
    }
}

/// Wait for the first item so that a rejected request fails before any byte is sent.
async fn prime(mut stream: TextStream) -> Result<TextStream> {
    match stream.next().await {
        None => {
            debug!("Completion produced no text");
            Ok(stream::empty().boxed())
        }
        Some(Err(e)) => Err(e),
        Some(Ok(first)) => Ok(stream::once(future::ready(Ok(first))).chain(stream).boxed()),
    }
}

/// Yield the first error, then end.
fn stop_after_error(stream: TextStream) -> TextStream {
    stream
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            if let Err(e) = &item {
                warn!("Generation stream failed: {}", e);
                *failed = true;
            }
            future::ready(Some(item))
        })
        .boxed()
}
