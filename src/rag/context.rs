//! Context retrieval and prompt augmentation.

use super::message::ChatMessage;
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_index::{IndexMatch, VectorIndex};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Retrieves the nearest reviews for a query.
pub struct ContextBuilder {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: 5,
        }
    }

    /// Set the number of neighbours requested from the index.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed the query and fetch its nearest neighbours with metadata.
    pub async fn build(&self, query: &str) -> Result<Vec<IndexMatch>> {
        let query_embedding = self.embedder.embed(query).await?;

        let matches = self
            .index
            .query(&query_embedding, self.top_k, true)
            .await?;

        debug!("Retrieved {} matches", matches.len());
        Ok(matches)
    }
}

/// Format up to `limit` matches into the block appended to the user's question.
pub fn format_context_for_prompt(prompts: &Prompts, matches: &[IndexMatch], limit: usize) -> String {
    matches
        .iter()
        .take(limit)
        .map(|m| {
            let mut vars = HashMap::new();
            vars.insert("professor".to_string(), m.id.clone());
            vars.insert("review".to_string(), m.metadata_text("review"));
            vars.insert("subject".to_string(), m.metadata_text("subject"));
            vars.insert("stars".to_string(), m.metadata_text("stars"));
            prompts.render_with_custom(&prompts.rag.match_block, &vars)
        })
        .collect()
}

/// Build the message list sent to the generation model.
///
/// Order: system instruction, every message but the last, then the last
/// message's content with `context` appended, sent as a user message.
pub fn augment_conversation(
    system_prompt: &str,
    conversation: &[ChatMessage],
    context: &str,
) -> Vec<ChatMessage> {
    let Some((last, history)) = conversation.split_last() else {
        return vec![ChatMessage::system(system_prompt)];
    };

    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(format!("{}{}", last.content, context)));
    messages
}
