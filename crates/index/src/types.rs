//! Index type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A text chunk with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Source document ID
    pub source_id: String,

    /// Position within the source
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector (unit-normalized)
    pub embedding: Vec<f32>,
}

/// A source document tracked in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Unique source identifier
    pub source_id: String,

    /// Source path
    pub path: String,

    /// When this source was indexed
    pub indexed_at: DateTime<Utc>,

    /// Number of chunks created from this source
    pub chunk_count: u32,

    /// Source size in bytes
    pub byte_count: u64,
}

/// Index statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of indexed sources
    pub sources: u32,

    /// Number of stored chunks
    pub chunks: u32,
}

/// Statistics from an ingest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of sources processed
    pub sources: u32,

    /// Number of chunks created
    pub chunks: u32,

    /// Total bytes processed
    pub bytes: u64,
}
