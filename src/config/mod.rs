//! Configuration module for profrag.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    EmbeddingSettings, GenerationSettings, OpenAISettings, PineconeSettings, PromptSettings,
    RetrievalSettings, ServerSettings, Settings,
};
