//! LLM integration crate for askdoc.
//!
//! This crate provides a provider-agnostic abstraction for text completion.
//! Requests can carry an optional JSON-schema `format` constraint so that
//! callers needing structured output (e.g., binary relevance grading) get
//! schema-constrained decoding instead of free text.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - Future: OpenAI-compatible endpoints
//!
//! # Example
//! ```no_run
//! use askdoc_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OllamaClient;
