//! OpenAI client configuration with sensible defaults.

use crate::config::OpenAISettings;
use crate::error::{ProfRagError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Shared OpenAI client type.
pub type OpenAIClient = Client<OpenAIConfig>;

/// Create an OpenAI client from settings.
///
/// The API key comes from `OPENAI_API_KEY` and is not checked here; a missing
/// key surfaces as an error on the first request.
///
/// No overall request timeout is set, since a streamed completion lasts as
/// long as the model keeps producing tokens. Connecting and each individual
/// read are bounded instead.
pub fn create_client(settings: &OpenAISettings) -> Result<OpenAIClient> {
    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .read_timeout(Duration::from_secs(settings.read_timeout_secs))
        .build()
        .map_err(|e| ProfRagError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = &settings.api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
