//! JSONL-backed document store with cosine top-k search.
//!
//! Chunks and source records live in memory and persist as line-delimited
//! JSON under the index directory (`chunks.jsonl`, `sources.jsonl`).
//! Embeddings are stored unit-normalized, so cosine similarity reduces to
//! a dot product.

use crate::types::{DocumentChunk, IndexStats, SourceRecord};
use askdoc_core::{AppError, AppResult};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// On-disk and in-memory document store.
pub struct DocumentStore {
    dir: PathBuf,
    chunks: Vec<DocumentChunk>,
    sources: Vec<SourceRecord>,
}

impl DocumentStore {
    /// Open a store rooted at `dir`, loading any persisted records.
    ///
    /// A missing directory is not an error; it means nothing has been
    /// indexed yet.
    pub fn open(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        let chunks = read_jsonl(&dir.join("chunks.jsonl"))?;
        let sources = read_jsonl(&dir.join("sources.jsonl"))?;

        tracing::debug!(
            "Opened document store at {:?} ({} chunks, {} sources)",
            dir,
            chunks.len(),
            sources.len()
        );

        Ok(Self {
            dir,
            chunks,
            sources,
        })
    }

    /// Insert chunks into the store.
    pub fn add_chunks(&mut self, chunks: Vec<DocumentChunk>) {
        self.chunks.extend(chunks);
    }

    /// Record an indexed source.
    pub fn add_source(&mut self, source: SourceRecord) {
        self.sources.push(source);
    }

    /// Top-k most similar chunks to the query embedding, best first.
    pub fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<(&DocumentChunk, f32)>> {
        let mut scored: Vec<(&DocumentChunk, f32)> = self
            .chunks
            .iter()
            .map(|chunk| (chunk, dot(query_embedding, &chunk.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Whether anything has been indexed at all.
    pub fn has_content(&self) -> bool {
        !self.chunks.is_empty()
    }

    /// Index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            sources: self.sources.len() as u32,
            chunks: self.chunks.len() as u32,
        }
    }

    /// Remove all chunks and sources, in memory and on disk.
    pub fn reset(&mut self) -> AppResult<()> {
        self.chunks.clear();
        self.sources.clear();

        for file in ["chunks.jsonl", "sources.jsonl"] {
            let path = self.dir.join(file);
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|e| AppError::Index(format!("Failed to remove {:?}: {}", path, e)))?;
            }
        }

        Ok(())
    }

    /// Write all records to disk.
    pub fn flush(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::Index(format!(
                "Failed to create index directory {:?}: {}",
                self.dir, e
            ))
        })?;

        write_jsonl(&self.dir.join("chunks.jsonl"), &self.chunks)?;
        write_jsonl(&self.dir.join("sources.jsonl"), &self.sources)?;

        tracing::debug!(
            "Flushed {} chunks, {} sources to {:?}",
            self.chunks.len(),
            self.sources.len(),
            self.dir
        );

        Ok(())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(path)
        .map_err(|e| AppError::Index(format!("Failed to open {:?}: {}", path, e)))?;

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| AppError::Index(format!("Failed to read {:?}: {}", path, e)))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(&line)
            .map_err(|e| AppError::Index(format!("Corrupt record in {:?}: {}", path, e)))?;
        records.push(record);
    }

    Ok(records)
}

fn write_jsonl<T: serde::Serialize>(path: &Path, records: &[T]) -> AppResult<()> {
    let mut file = fs::File::create(path)
        .map_err(|e| AppError::Index(format!("Failed to create {:?}: {}", path, e)))?;

    for record in records {
        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)
            .map_err(|e| AppError::Index(format!("Failed to write {:?}: {}", path, e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn chunk(id: &str, text: &str, embedding: Vec<f32>) -> DocumentChunk {
        DocumentChunk {
            id: id.to_string(),
            source_id: "src".to_string(),
            position: 0,
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_open_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(temp.path().join("nope")).unwrap();
        assert!(!store.has_content());
        assert_eq!(store.stats().chunks, 0);
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();
        store.add_chunks(vec![
            chunk("a", "far", vec![0.0, 1.0]),
            chunk("b", "near", vec![1.0, 0.0]),
            chunk("c", "middle", vec![0.7071, 0.7071]),
        ]);

        let results = store.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.text, "near");
        assert_eq!(results[1].0.text, "middle");
        assert!(results[0].1 > results[1].1);
    }

    #[test]
    fn test_search_empty_store_returns_nothing() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(temp.path()).unwrap();
        let results = store.search(&[1.0, 0.0], 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_persistence_round_trip() {
        let temp = TempDir::new().unwrap();

        {
            let mut store = DocumentStore::open(temp.path()).unwrap();
            store.add_chunks(vec![chunk("a", "hello", vec![1.0, 0.0])]);
            store.add_source(SourceRecord {
                source_id: "src".to_string(),
                path: "doc.md".to_string(),
                indexed_at: Utc::now(),
                chunk_count: 1,
                byte_count: 5,
            });
            store.flush().unwrap();
        }

        let reopened = DocumentStore::open(temp.path()).unwrap();
        assert!(reopened.has_content());
        assert_eq!(reopened.stats().chunks, 1);
        assert_eq!(reopened.stats().sources, 1);

        let results = reopened.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(results[0].0.text, "hello");
    }

    #[test]
    fn test_reset_clears_memory_and_disk() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();
        store.add_chunks(vec![chunk("a", "hello", vec![1.0])]);
        store.flush().unwrap();

        store.reset().unwrap();
        assert!(!store.has_content());

        let reopened = DocumentStore::open(temp.path()).unwrap();
        assert!(!reopened.has_content());
    }
}
