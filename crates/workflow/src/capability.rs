//! Capability interfaces consumed by the workflow engine.
//!
//! These traits are the only seams between the engine and the outside
//! world. Plain strings cross the boundary; no provider-specific types
//! leak through. Implementations live in other crates (`askdoc-index` for
//! the document index, [`crate::gateway`] for the model gateway) and are
//! injected at construction.

use askdoc_core::AppResult;
use serde::{Deserialize, Serialize};

/// Binary relevance grade for a passage against a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// The passage bears on the question.
    Relevant,
    /// The passage does not bear on the question.
    NotRelevant,
}

/// Semantic document index capability.
#[async_trait::async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Return passages most similar to the query, best first.
    ///
    /// An empty result means the query matched nothing, which is distinct
    /// from "nothing indexed at all"; see [`has_content`](Self::has_content).
    async fn search(&self, query: &str) -> AppResult<Vec<String>>;

    /// Whether anything has been indexed at all.
    ///
    /// Checked once at the batch entry point, before any session runs.
    async fn has_content(&self) -> AppResult<bool>;
}

/// Language model gateway capability.
///
/// Exactly the three operations the workflow needs. Substituting a
/// different backing model never touches workflow logic.
#[async_trait::async_trait]
pub trait ModelGateway: Send + Sync {
    /// Judge whether a single document is relevant to the question.
    ///
    /// Implementations must constrain the model to the two [`Grade`]
    /// values (schema-constrained decoding). Output that does not map to
    /// exactly one grade is `AppError::MalformedModelOutput`, never a
    /// silent default.
    async fn classify(&self, document: &str, question: &str) -> AppResult<Grade>;

    /// Reformulate the question to improve retrieval.
    ///
    /// Must return exactly one question; empty or multi-valued output is
    /// `AppError::MalformedModelOutput`.
    async fn rewrite(&self, question: &str) -> AppResult<String>;

    /// Synthesize an answer from the question and retrieval context.
    async fn answer(&self, question: &str, context: &str) -> AppResult<String>;
}
