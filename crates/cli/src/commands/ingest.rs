//! Ingest command handler.

use askdoc_core::{config::AppConfig, AppResult};
use askdoc_index::{create_provider, ingest, DocumentStore, IngestOptions};
use clap::Args;
use std::path::PathBuf;

/// Index documents into the corpus
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to index
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Clear the existing index first
    #[arg(long)]
    pub reset: bool,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Ingesting {} path(s)", self.paths.len());

        let mut store = DocumentStore::open(config.index_dir())?;

        let embedder = create_provider(
            &config.embedding.provider,
            &config.embedding.model,
            config.embedding.dimensions,
            config.endpoint.as_deref(),
        )?;

        let options = IngestOptions {
            paths: self.paths.clone(),
            reset: self.reset,
            chunk_size: config.ingest.chunk_size,
            chunk_overlap: config.ingest.chunk_overlap,
        };

        let stats = ingest(&mut store, embedder.as_ref(), &options).await?;

        println!(
            "Indexed {} source(s) into {} chunk(s) ({} bytes)",
            stats.sources, stats.chunks, stats.bytes
        );

        Ok(())
    }
}
