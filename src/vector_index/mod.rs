//! Vector index abstraction for profrag.
//!
//! The index itself is hosted; this module only describes the query and
//! upsert contract and provides a Pinecone client for it.

mod pinecone;

pub use pinecone::PineconeIndex;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Metadata stored alongside each vector.
pub type Metadata = Map<String, Value>;

/// One nearest-neighbour returned by a query. Rank is the position in the result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    /// Record identifier (the professor's name).
    pub id: String,
    /// Similarity score reported by the index.
    #[serde(default)]
    pub score: f32,
    /// Stored metadata, empty when the query did not ask for it.
    #[serde(default)]
    pub metadata: Metadata,
}

impl IndexMatch {
    /// Create a match with the given metadata.
    pub fn new(id: impl Into<String>, score: f32, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            score,
            metadata,
        }
    }

    /// Render a metadata attribute as plain text.
    ///
    /// Strings are returned verbatim, numbers and booleans in their JSON form,
    /// and missing or null attributes as an empty string.
    pub fn metadata_text(&self, key: &str) -> String {
        match self.metadata.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// A vector to be written to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Metadata,
}

/// Per-namespace statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSummary {
    #[serde(default)]
    pub vector_count: u64,
}

/// Index-wide statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default)]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub index_fullness: f64,
    #[serde(default)]
    pub total_vector_count: u64,
    #[serde(default)]
    pub namespaces: HashMap<String, NamespaceSummary>,
}

/// Trait for hosted vector index clients.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return the `top_k` nearest neighbours of `vector`, closest first.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<IndexMatch>>;

    /// Write records, returning how many the index accepted.
    async fn upsert(&self, records: &[IndexRecord]) -> Result<usize>;

    /// Fetch index statistics.
    async fn describe_stats(&self) -> Result<IndexStats>;
}
