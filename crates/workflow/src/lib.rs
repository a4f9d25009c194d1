//! Retrieval-and-answer workflow engine for askdoc.
//!
//! This crate is the control-flow core of the system: a bounded-retry
//! state machine that answers a question against an indexed corpus by
//! retrieving passages, grading their relevance, and either synthesizing
//! an answer, rewriting the question and retrying, or declining as
//! off-topic.
//!
//! The engine depends on two capability interfaces it does not implement:
//! a semantic document index ([`DocumentIndex`]) and a language model
//! gateway ([`ModelGateway`]). Both are injected at construction; the
//! engine owns no I/O of its own beyond calling them.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use askdoc_workflow::{run_batch, WorkflowEngine, DocumentIndex, ModelGateway};
//!
//! # async fn example(
//! #     index: Arc<dyn DocumentIndex>,
//! #     gateway: Arc<dyn ModelGateway>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = WorkflowEngine::new(index, gateway);
//! let questions = vec!["What is the capital?".to_string()];
//! let results = run_batch(&engine, &questions, 4).await?;
//! for item in results {
//!     println!("{}: {:?}", item.question, item.outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod capability;
pub mod engine;
pub mod gateway;
pub mod session;

// Re-export main types
pub use batch::{run_batch, BatchItem};
pub use capability::{DocumentIndex, Grade, ModelGateway};
pub use engine::{next_state, route, State, WorkflowEngine, DECLINE_MESSAGE, MAX_REWRITE_CYCLES};
pub use gateway::PromptGateway;
pub use session::Session;
