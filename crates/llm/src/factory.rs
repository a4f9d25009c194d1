//! LLM provider factory.
//!
//! Creates LLM clients from a provider name and optional endpoint. The
//! returned handle is constructed once at process start and shared by
//! reference; nothing here holds hidden global state.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use askdoc_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama")
/// * `endpoint` - Optional custom endpoint URL
///
/// # Errors
/// Returns an error if the provider is unknown or not yet implemented.
pub fn create_client(provider: &str, endpoint: Option<&str>) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url);
            Ok(Arc::new(client))
        }
        "openai" => Err(AppError::Config(
            "OpenAI-compatible provider not yet implemented".to_string(),
        )),
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
