//! OpenAI chat completions with streaming.

use super::{ChatModel, TextStream};
use crate::config::GenerationSettings;
use crate::error::{ProfRagError, Result};
use crate::openai::OpenAIClient;
use crate::rag::{ChatMessage, Role};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, CreateChatCompletionStreamResponse,
};
use async_trait::async_trait;
use futures::{future, StreamExt};
use tracing::{debug, instrument};

/// Chat model backed by the OpenAI chat completions API.
pub struct OpenAIChatModel {
    client: OpenAIClient,
    model: String,
}

impl OpenAIChatModel {
    pub fn new(client: OpenAIClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn from_settings(client: OpenAIClient, settings: &GenerationSettings) -> Self {
        Self::new(client, &settings.model)
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TextStream> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(to_request_messages(messages)?)
            .stream(true)
            .build()
            .map_err(|e| ProfRagError::Generation(e.to_string()))?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| ProfRagError::OpenAI(format!("Failed to start completion: {}", e)))?;

        debug!("Completion stream opened");

        Ok(stream
            .filter_map(|chunk| {
                future::ready(match chunk {
                    Ok(response) => delta_text(response).map(Ok),
                    Err(e) => Some(Err(ProfRagError::OpenAI(format!(
                        "Completion stream failed: {}",
                        e
                    )))),
                })
            })
            .boxed())
    }
}

/// Text delta of the first choice, if any.
fn delta_text(response: CreateChatCompletionStreamResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
}

fn to_request_messages(messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|message| {
            let built: ChatCompletionRequestMessage = match message.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| ProfRagError::Generation(e.to_string()))?
                    .into(),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| ProfRagError::Generation(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| ProfRagError::Generation(e.to_string()))?
                    .into(),
            };
            Ok(built)
        })
        .collect()
}
