//! Review ingestion command.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::ingest::{load_reviews, Ingestor};
use crate::openai::create_client;
use crate::vector_index::PineconeIndex;
use std::path::Path;
use std::sync::Arc;

/// Embed the reviews in `file` and upsert them into the configured index.
pub async fn run_ingest(file: &Path, create_index: bool, settings: Settings) -> anyhow::Result<()> {
    let reviews = load_reviews(file)?;
    Output::info(&format!("Loaded {} reviews from {}", reviews.len(), file.display()));

    let client = create_client(&settings.openai)?;
    let embedder = Arc::new(OpenAIEmbedder::from_settings(client, &settings.embedding));
    let index = Arc::new(PineconeIndex::from_env(settings.pinecone.clone())?);

    if create_index {
        let spinner = Output::spinner(&format!("Creating index {}...", index.index_name()));
        let created = index.create_index(embedder.dimensions()).await;
        spinner.finish_and_clear();
        if created? {
            Output::success(&format!("Created index {}", index.index_name()));
        } else {
            Output::warning(&format!("Index {} already exists", index.index_name()));
        }
    }

    let spinner = Output::spinner("Embedding and upserting reviews...");
    let report = Ingestor::new(embedder, index).ingest(&reviews).await;
    spinner.finish_and_clear();
    let report = report?;

    Output::success(&format!("Upserted count: {}", report.upserted));
    Output::header("Index statistics");
    if let Some(dimension) = report.stats.dimension {
        Output::kv("Dimension", &dimension.to_string());
    }
    Output::kv("Total vectors", &report.stats.total_vector_count.to_string());
    Output::kv("Fullness", &format!("{:.4}", report.stats.index_fullness));
    let mut namespaces: Vec<_> = report.stats.namespaces.iter().collect();
    namespaces.sort_by(|a, b| a.0.cmp(b.0));
    for (name, summary) in namespaces {
        let label = if name.is_empty() { "(default)" } else { name.as_str() };
        Output::kv(&format!("Namespace {}", label), &summary.vector_count.to_string());
    }

    Ok(())
}
