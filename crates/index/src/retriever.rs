//! Retrieval adapter: exposes the document store through the workflow's
//! `DocumentIndex` capability.
//!
//! Constructed once at process start and injected into the orchestrator;
//! there is no hidden process-wide index instance. The retriever reads a
//! store snapshot and never mutates it, so one instance serves any number
//! of concurrent sessions.

use crate::embeddings::provider::EmbeddingProvider;
use crate::store::DocumentStore;
use askdoc_core::AppResult;
use askdoc_workflow::DocumentIndex;
use std::sync::Arc;

/// Semantic retrieval over an opened document store.
pub struct Retriever {
    store: DocumentStore,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over an opened store.
    pub fn new(store: DocumentStore, embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self {
            store,
            embedder,
            top_k,
        }
    }
}

#[async_trait::async_trait]
impl DocumentIndex for Retriever {
    async fn search(&self, query: &str) -> AppResult<Vec<String>> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&query_embedding, self.top_k)?;

        tracing::debug!("Query matched {} passages", results.len());

        Ok(results
            .into_iter()
            .map(|(chunk, _score)| chunk.text.clone())
            .collect())
    }

    async fn has_content(&self) -> AppResult<bool> {
        Ok(self.store.has_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramEmbedder;
    use crate::types::DocumentChunk;
    use tempfile::TempDir;

    async fn store_with_texts(texts: &[&str], embedder: &TrigramEmbedder) -> DocumentStore {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let embeddings = embedder.embed_batch(&owned).await.unwrap();

        let chunks = owned
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (text, embedding))| DocumentChunk {
                id: format!("c{}", i),
                source_id: "src".to_string(),
                position: i as u32,
                text,
                embedding,
            })
            .collect();
        store.add_chunks(chunks);
        store
    }

    #[tokio::test]
    async fn test_search_returns_passage_texts() {
        let embedder = TrigramEmbedder::new(128);
        let store = store_with_texts(
            &[
                "Paris is the capital of France.",
                "Tokio is an asynchronous runtime for Rust.",
            ],
            &embedder,
        )
        .await;

        let retriever = Retriever::new(store, Arc::new(TrigramEmbedder::new(128)), 1);
        let passages = retriever.search("what is the capital of france").await.unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0], "Paris is the capital of France.");
    }

    #[tokio::test]
    async fn test_has_content_reflects_store() {
        let temp = TempDir::new().unwrap();
        let empty_store = DocumentStore::open(temp.path()).unwrap();
        let retriever = Retriever::new(empty_store, Arc::new(TrigramEmbedder::new(64)), 4);

        assert!(!retriever.has_content().await.unwrap());
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_no_passages() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(temp.path()).unwrap();
        let retriever = Retriever::new(store, Arc::new(TrigramEmbedder::new(64)), 4);

        let passages = retriever.search("anything").await.unwrap();
        assert!(passages.is_empty());
    }
}
