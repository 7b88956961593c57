//! Configuration settings for profrag.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub openai: OpenAISettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub retrieval: RetrievalSettings,
    pub pinecone: PineconeSettings,
    pub prompts: PromptSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Path of the chat endpoint.
    pub chat_route: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            chat_route: "/api/chat".to_string(),
        }
    }
}

/// OpenAI client settings. The API key is read from `OPENAI_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// Override for the API base URL (e.g. a proxy or a local mock).
    pub api_base: Option<String>,
    /// Timeout for establishing a connection, in seconds.
    pub connect_timeout_secs: u64,
    /// Longest silence tolerated between two reads of a response body, in
    /// seconds. Bounds stalled streams without capping a long completion.
    pub read_timeout_secs: u64,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_base: None,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat completion model.
    pub model: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of nearest neighbours requested from the index.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Pinecone index settings. The API key is read from `PINECONE_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeSettings {
    /// Index name.
    pub index_name: String,
    /// Data-plane host. Resolved from the control plane when unset.
    pub index_host: Option<String>,
    /// Namespace used for both queries and upserts.
    pub namespace: String,
    /// Control-plane base URL.
    pub control_plane_url: String,
    /// Value of the `X-Pinecone-API-Version` header.
    pub api_version: String,
    /// Serverless cloud used when creating the index.
    pub cloud: String,
    /// Serverless region used when creating the index.
    pub region: String,
    /// Similarity metric used when creating the index.
    pub metric: String,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            index_name: "rag".to_string(),
            index_host: None,
            namespace: "ns1".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            metric: "cosine".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ProfRagError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("profrag")
            .join("config.toml")
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upstream_contract() {
        let settings = Settings::default();
        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
        assert_eq!(settings.generation.model, "gpt-3.5-turbo");
        assert_eq!(settings.pinecone.index_name, "rag");
        assert_eq!(settings.server.chat_route, "/api/chat");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[pinecone]\nindex_host = \"rag-abc.svc.pinecone.io\"\n\n[retrieval]\ntop_k = 3\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.retrieval.top_k, 3);
        assert_eq!(
            settings.pinecone.index_host.as_deref(),
            Some("rag-abc.svc.pinecone.io")
        );
        assert_eq!(settings.pinecone.namespace, "ns1");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.server.port = 8080;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.bind_addr(), "127.0.0.1:8080");
    }
}
