//! Per-question session state.

use crate::capability::Grade;
use askdoc_core::{AppError, AppResult};

/// Separator between passages when joined into generation context.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Mutable state threaded through one workflow run.
///
/// A session is owned by exactly one in-flight run; concurrent sessions
/// never share or observe each other's state. After a terminal stage sets
/// `answer`, the session is returned to the caller and no longer mutated.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current question text; overwritten on rewrite.
    pub question: String,

    /// Passages retrieved for the current question; replaced wholesale on
    /// each retrieval.
    pub documents: Vec<String>,

    /// One grade per retrieved passage, aligned by position with
    /// `documents` immediately after grading.
    pub grades: Vec<Grade>,

    /// Final output; set exactly once, by a terminal stage.
    pub answer: Option<String>,

    /// Completed rewrite cycles. Starts at 0, incremented only by the
    /// rewrite stage, monotone within a session.
    pub loop_count: u32,
}

impl Session {
    /// Create a fresh session for a question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            grades: Vec::new(),
            answer: None,
            loop_count: 0,
        }
    }

    /// Whether any retrieved passage was graded relevant.
    pub fn has_relevant_document(&self) -> bool {
        self.grades.iter().any(|g| *g == Grade::Relevant)
    }

    /// Join the retrieved passages, in retrieval order, into one context
    /// string for answer synthesis.
    pub fn context(&self) -> String {
        self.documents.join(CONTEXT_SEPARATOR)
    }

    /// Consume the session, yielding the final answer.
    pub fn into_answer(self) -> AppResult<String> {
        self.answer
            .ok_or_else(|| AppError::Other("Workflow terminated without an answer".to_string()))
    }
}
