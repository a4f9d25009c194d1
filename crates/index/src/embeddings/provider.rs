//! Embedding provider trait and factory.

use askdoc_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Index("No embedding returned".to_string()))
    }
}

/// Create an embedding provider by name.
///
/// * `trigram`: deterministic, offline, no model required
/// * `ollama`: Ollama embedding endpoint
pub fn create_provider(
    provider: &str,
    model: &str,
    dimensions: usize,
    endpoint: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider {
        "trigram" => Ok(Arc::new(super::providers::TrigramEmbedder::new(dimensions))),

        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(super::providers::OllamaEmbedder::new(
                base_url, model, dimensions,
            )))
        }

        _ => Err(AppError::Index(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            provider
        ))),
    }
}
