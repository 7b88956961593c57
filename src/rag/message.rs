//! Conversation types and request-body validation.

use crate::error::{ProfRagError, Result};
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Parse and validate a chat request body.
///
/// The body must be a JSON array of `{role, content}` objects, non-empty, and
/// the last message must carry non-blank content since it becomes the query.
pub fn parse_conversation(body: &[u8]) -> Result<Vec<ChatMessage>> {
    let conversation: Vec<ChatMessage> = serde_json::from_slice(body)
        .map_err(|e| ProfRagError::InvalidInput(format!("Malformed conversation: {}", e)))?;

    let last = conversation
        .last()
        .ok_or_else(|| ProfRagError::InvalidInput("Conversation is empty".to_string()))?;

    if last.content.trim().is_empty() {
        return Err(ProfRagError::InvalidInput(
            "Last message has no content".to_string(),
        ));
    }

    Ok(conversation)
}
