//! Prompt templates for askdoc.
//!
//! This crate holds the three parameterized instruction templates used by
//! the question-answering workflow (relevance grading, question
//! rewriting, and answer synthesis) and renders them with Handlebars.
//! Templates are pure data; nothing here performs I/O or holds workflow
//! state.

pub mod templates;

pub use templates::{PromptSet, RenderedPrompt};
