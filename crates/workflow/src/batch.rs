//! Batch orchestration: one workflow session per question.
//!
//! Sessions are independent, with no shared mutable state, so they run
//! concurrently purely for throughput, with results collected in input
//! order. A failure in one session is captured for that question alone;
//! sibling questions are unaffected.

use crate::engine::WorkflowEngine;
use askdoc_core::{AppError, AppResult};
use futures::StreamExt;

/// Result of one question in a batch.
///
/// `question` is always the *original* input question, never a rewritten
/// variant.
#[derive(Debug)]
pub struct BatchItem {
    /// The question as submitted.
    pub question: String,

    /// The answer, or this question's failure.
    pub outcome: AppResult<String>,
}

/// Run one workflow session per question, preserving input order.
///
/// Precondition: the index must have content. An empty index fails the
/// whole batch once with `IndexNotReady` before any session starts, rather
/// than running every session only to fail at retrieval.
///
/// `parallelism` bounds the number of sessions in flight at once;
/// correctness does not depend on it.
pub async fn run_batch(
    engine: &WorkflowEngine,
    questions: &[String],
    parallelism: usize,
) -> AppResult<Vec<BatchItem>> {
    if !engine.index().has_content().await? {
        return Err(AppError::IndexNotReady);
    }

    tracing::info!("Running batch of {} questions", questions.len());

    let items = futures::stream::iter(questions.iter().cloned().map(|question| async move {
        let outcome = engine
            .run(&question)
            .await
            .and_then(|session| session.into_answer());

        if let Err(ref e) = outcome {
            tracing::warn!(question = %question, "Session failed: {}", e);
        }

        BatchItem { question, outcome }
    }))
    .buffered(parallelism.max(1))
    .collect::<Vec<_>>()
    .await;

    Ok(items)
}
