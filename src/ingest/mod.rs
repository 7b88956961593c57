//! Loading professor reviews into the vector index.
//!
//! Reads a `{"reviews": [...]}` document, embeds every review text with the
//! same model the chat endpoint queries with, and upserts one record per
//! review keyed by professor name.

use crate::embedding::Embedder;
use crate::error::{ProfRagError, Result};
use crate::vector_index::{IndexRecord, IndexStats, Metadata, VectorIndex};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// A single professor review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub professor: String,
    pub review: String,
    pub subject: String,
    pub stars: Number,
}

impl Review {
    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("review".to_string(), Value::String(self.review.clone()));
        metadata.insert("subject".to_string(), Value::String(self.subject.clone()));
        metadata.insert("stars".to_string(), Value::Number(self.stars.clone()));
        metadata
    }
}

#[derive(Debug, Deserialize)]
struct ReviewFile {
    reviews: Vec<Review>,
}

/// Outcome of an ingest run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub reviews: usize,
    pub upserted: usize,
    pub stats: IndexStats,
}

/// Parse a reviews document.
pub fn parse_reviews(content: &str) -> Result<Vec<Review>> {
    let file: ReviewFile = serde_json::from_str(content)?;
    Ok(file.reviews)
}

/// Read and parse a reviews file.
pub fn load_reviews(path: &Path) -> Result<Vec<Review>> {
    let content = std::fs::read_to_string(path)?;
    parse_reviews(&content)
}

/// Pair reviews with their embeddings.
pub fn to_records(reviews: &[Review], embeddings: Vec<Vec<f32>>) -> Result<Vec<IndexRecord>> {
    if reviews.len() != embeddings.len() {
        return Err(ProfRagError::Embedding(format!(
            "Got {} embeddings for {} reviews",
            embeddings.len(),
            reviews.len()
        )));
    }

    Ok(reviews
        .iter()
        .zip(embeddings)
        .map(|(review, values)| IndexRecord {
            id: review.professor.clone(),
            values,
            metadata: review.metadata(),
        })
        .collect())
}

/// Embeds reviews and writes them to the index.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    #[instrument(skip(self, reviews), fields(count = reviews.len()))]
    pub async fn ingest(&self, reviews: &[Review]) -> Result<IngestReport> {
        let texts: Vec<String> = reviews.iter().map(|r| r.review.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        let records = to_records(reviews, embeddings)?;

        let upserted = self.index.upsert(&records).await?;
        info!("Upserted {} records", upserted);

        let stats = self.index.describe_stats().await?;

        Ok(IngestReport {
            reviews: reviews.len(),
            upserted,
            stats,
        })
    }
}
