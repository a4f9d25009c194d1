//! Document index crate for askdoc.
//!
//! Owns everything around the corpus the workflow queries: chunk storage
//! with cosine top-k search and JSONL persistence, embedding providers,
//! the ingestion pipeline, and the [`Retriever`] adapter that exposes the
//! store through the workflow's `DocumentIndex` capability.
//!
//! The store holds no workflow logic: it answers similarity queries and
//! reports whether anything has been indexed, nothing more.

pub mod embeddings;
pub mod ingest;
pub mod retriever;
pub mod store;
pub mod types;

// Re-export main types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use ingest::{ingest, IngestOptions};
pub use retriever::Retriever;
pub use store::DocumentStore;
pub use types::{DocumentChunk, IndexStats, IngestStats, SourceRecord};
