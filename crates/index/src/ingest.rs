//! Document ingestion pipeline.
//!
//! Walks local paths, splits text files into overlapping chunks, embeds
//! them in batches, and upserts the results into the document store. No
//! workflow logic lives here.

use crate::embeddings::provider::EmbeddingProvider;
use crate::store::DocumentStore;
use crate::types::{DocumentChunk, IngestStats, SourceRecord};
use askdoc_core::{AppError, AppResult};
use chrono::Utc;
use std::path::{Path, PathBuf};
use text_splitter::{ChunkConfig, TextSplitter};
use uuid::Uuid;

/// File extensions treated as ingestible text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "rst"];

/// Options for an ingest run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Files or directories to ingest
    pub paths: Vec<PathBuf>,

    /// Clear the store before ingesting
    pub reset: bool,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

/// Ingest documents into the store.
pub async fn ingest(
    store: &mut DocumentStore,
    embedder: &dyn EmbeddingProvider,
    options: &IngestOptions,
) -> AppResult<IngestStats> {
    if options.reset {
        tracing::info!("Resetting document store before ingest");
        store.reset()?;
    }

    let splitter = build_splitter(options.chunk_size, options.chunk_overlap)?;

    let files = discover_files(&options.paths)?;
    if files.is_empty() {
        return Err(AppError::Index(
            "No ingestible text files found under the given paths".to_string(),
        ));
    }

    let mut stats = IngestStats {
        sources: 0,
        chunks: 0,
        bytes: 0,
    };

    for file in files {
        let text = std::fs::read_to_string(&file)
            .map_err(|e| AppError::Index(format!("Failed to read {:?}: {}", file, e)))?;

        let pieces: Vec<String> = splitter.chunks(&text).map(String::from).collect();
        if pieces.is_empty() {
            tracing::debug!("Skipping empty file {:?}", file);
            continue;
        }

        let embeddings = embedder.embed_batch(&pieces).await?;

        let source_id = Uuid::new_v4().to_string();
        let chunks: Vec<DocumentChunk> = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(position, (text, embedding))| DocumentChunk {
                id: Uuid::new_v4().to_string(),
                source_id: source_id.clone(),
                position: position as u32,
                text,
                embedding,
            })
            .collect();

        let chunk_count = chunks.len() as u32;
        let byte_count = text.len() as u64;

        tracing::info!("Indexed {:?}: {} chunks", file, chunk_count);

        store.add_chunks(chunks);
        store.add_source(SourceRecord {
            source_id,
            path: file.display().to_string(),
            indexed_at: Utc::now(),
            chunk_count,
            byte_count,
        });

        stats.sources += 1;
        stats.chunks += chunk_count;
        stats.bytes += byte_count;
    }

    store.flush()?;
    Ok(stats)
}

fn build_splitter(
    chunk_size: usize,
    chunk_overlap: usize,
) -> AppResult<TextSplitter<text_splitter::Characters>> {
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(chunk_overlap)
        .map_err(|e| AppError::Index(format!("Invalid chunking configuration: {}", e)))?;
    Ok(TextSplitter::new(config))
}

/// Expand the given paths into ingestible files, skipping hidden entries.
fn discover_files(paths: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(AppError::Index(format!("Path does not exist: {:?}", path)));
        }

        if path.is_file() {
            if is_text_file(path) {
                files.push(path.clone());
            }
            continue;
        }

        for entry in walkdir::WalkDir::new(path)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.') && name != "target" && name != "node_modules"
            })
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_text_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
