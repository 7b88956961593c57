//! Pinecone REST client.
//!
//! Uses the control plane to create indexes and look up their host, and the
//! per-index data plane for queries, upserts and statistics.

use super::{IndexMatch, IndexRecord, IndexStats, Metadata, VectorIndex};
use crate::config::PineconeSettings;
use crate::error::{ProfRagError, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};
use url::Url;

const API_KEY_ENV: &str = "PINECONE_API_KEY";
const UPSERT_BATCH_SIZE: usize = 100;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for a single Pinecone index.
pub struct PineconeIndex {
    http: reqwest::Client,
    api_key: String,
    settings: PineconeSettings,
    host: OnceCell<Url>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Deserialize)]
struct RawMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexRecord],
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

impl PineconeIndex {
    /// Create a client with an explicit API key.
    pub fn new(settings: PineconeSettings, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            settings,
            host: OnceCell::new(),
        })
    }

    /// Create a client reading the API key from `PINECONE_API_KEY`.
    ///
    /// A missing key is not an error here; requests will be rejected upstream.
    pub fn from_env(settings: PineconeSettings) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        if api_key.is_empty() {
            debug!("{} is not set", API_KEY_ENV);
        }
        Self::new(settings, api_key)
    }

    /// Name of the index this client targets.
    pub fn index_name(&self) -> &str {
        &self.settings.index_name
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.settings.api_version)
    }

    fn control_plane_url(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.settings.control_plane_url)?;
        Ok(base.join(path)?)
    }

    /// Data-plane base URL, resolved on first use.
    async fn data_plane(&self) -> Result<&Url> {
        self.host
            .get_or_try_init(|| async {
                match &self.settings.index_host {
                    Some(host) => parse_host(host),
                    None => self.resolve_host().await,
                }
            })
            .await
    }

    async fn data_plane_url(&self, path: &str) -> Result<Url> {
        Ok(self.data_plane().await?.join(path)?)
    }

    #[instrument(skip(self), fields(index = %self.settings.index_name))]
    async fn resolve_host(&self) -> Result<Url> {
        let url = self.control_plane_url(&format!("indexes/{}", self.settings.index_name))?;
        let response = check(self.authorize(self.http.get(url)).send().await?).await?;
        let described: DescribeIndexResponse = response.json().await?;
        debug!("Resolved index host {}", described.host);
        parse_host(&described.host)
    }

    /// Create the serverless index. Returns `false` if it already exists.
    #[instrument(skip(self), fields(index = %self.settings.index_name))]
    pub async fn create_index(&self, dimension: usize) -> Result<bool> {
        let url = self.control_plane_url("indexes")?;
        let body = json!({
            "name": self.settings.index_name,
            "dimension": dimension,
            "metric": self.settings.metric,
            "spec": {
                "serverless": {
                    "cloud": self.settings.cloud,
                    "region": self.settings.region,
                }
            }
        });

        let response = self.authorize(self.http.post(url)).json(&body).send().await?;
        if response.status() == StatusCode::CONFLICT {
            info!("Index {} already exists", self.settings.index_name);
            return Ok(false);
        }
        check(response).await?;
        info!("Created index {}", self.settings.index_name);
        Ok(true)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, vector), fields(index = %self.settings.index_name))]
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<IndexMatch>> {
        let url = self.data_plane_url("query").await?;
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata,
            include_values: false,
            namespace: &self.settings.namespace,
        };

        let response = check(self.authorize(self.http.post(url)).json(&body).send().await?).await?;
        let parsed: QueryResponse = response.json().await?;

        debug!("Index returned {} matches", parsed.matches.len());
        Ok(parsed
            .matches
            .into_iter()
            .map(|m| IndexMatch::new(m.id, m.score, m.metadata.unwrap_or_default()))
            .collect())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, records: &[IndexRecord]) -> Result<usize> {
        let url = self.data_plane_url("vectors/upsert").await?;
        let mut upserted = 0;

        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let body = UpsertRequest {
                vectors: batch,
                namespace: &self.settings.namespace,
            };
            let response =
                check(self.authorize(self.http.post(url.clone())).json(&body).send().await?)
                    .await?;
            let parsed: UpsertResponse = response.json().await?;
            upserted += parsed.upserted_count;
        }

        Ok(upserted)
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        let url = self.data_plane_url("describe_index_stats").await?;
        let response = check(self.authorize(self.http.post(url)).json(&json!({})).send().await?)
            .await?;
        Ok(response.json().await?)
    }
}

/// Turn a bare Pinecone host into a base URL.
fn parse_host(host: &str) -> Result<Url> {
    let host = host.trim_end_matches('/');
    let url = if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/", host)
    } else {
        format!("https://{}/", host)
    };
    Ok(Url::parse(&url)?)
}

/// Map non-success responses to an error carrying the body text.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProfRagError::Pinecone {
        status: status.as_u16(),
        body,
    })
}
