//! Deterministic trigram embedding provider.
//!
//! Hashes character trigrams and whole words into a fixed-dimension
//! vector. Not semantically comparable to a real embedding model, but
//! deterministic and content-dependent, which makes it usable offline and
//! in tests.

use crate::embeddings::provider::EmbeddingProvider;
use askdoc_core::AppResult;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x1000_0000_01b3;

/// Offline embedding provider based on trigram hashing.
#[derive(Debug)]
pub struct TrigramEmbedder {
    dimensions: usize,
}

impl TrigramEmbedder {
    /// Create a trigram embedder with the given vector dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        for word in lower.split_whitespace().filter(|w| w.len() > 2) {
            let chars: Vec<char> = word.chars().collect();

            // Character trigrams spread each word over several dimensions.
            for window in chars.windows(3) {
                let mut hash = FNV_OFFSET;
                for ch in window {
                    for byte in (*ch as u32).to_le_bytes() {
                        hash = (hash ^ byte as u64).wrapping_mul(FNV_PRIME);
                    }
                }
                embedding[(hash as usize) % self.dimensions] += 1.0;
            }

            // Whole-word signal on top of the trigrams.
            let mut hash = FNV_OFFSET;
            for byte in word.bytes() {
                hash = (hash ^ byte as u64).wrapping_mul(FNV_PRIME);
            }
            embedding[(hash as usize) % self.dimensions] += 2.0;
        }

        // Unit-normalize so cosine similarity is a dot product.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedding_has_requested_dimensions() {
        let embedder = TrigramEmbedder::new(256);
        let embedding = embedder.embed("hello world").await.unwrap();
        assert_eq!(embedding.len(), 256);
    }

    #[tokio::test]
    async fn test_embedding_is_unit_normalized() {
        let embedder = TrigramEmbedder::new(256);
        let embedding = embedder.embed("the quick brown fox").await.unwrap();

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_embedding_is_deterministic() {
        let embedder = TrigramEmbedder::new(256);
        let first = embedder.embed("deterministic input").await.unwrap();
        let second = embedder.embed("deterministic input").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let embedder = TrigramEmbedder::new(256);
        let first = embedder.embed("capital of france").await.unwrap();
        let second = embedder.embed("rust borrow checker").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_similar_texts_score_higher() {
        let embedder = TrigramEmbedder::new(256);
        let query = embedder.embed("capital city of france").await.unwrap();
        let close = embedder.embed("paris is the capital of france").await.unwrap();
        let far = embedder.embed("tokio spawns asynchronous tasks").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&query, &close) > dot(&query, &far));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = TrigramEmbedder::new(64);
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|v| *v == 0.0));
    }
}
