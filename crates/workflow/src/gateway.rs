//! Prompt-backed implementation of the model gateway capability.
//!
//! Composes an [`LlmClient`] with the workflow prompt templates. The
//! classify operation uses schema-constrained decoding so the model can
//! only emit one of the two grade values; anything else is a contract
//! violation surfaced as `MalformedModelOutput`, never coerced.

use crate::capability::{Grade, ModelGateway};
use askdoc_core::{AppError, AppResult};
use askdoc_llm::{LlmClient, LlmRequest};
use askdoc_prompt::{PromptSet, RenderedPrompt};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Wire format of the constrained grading verdict.
#[derive(Debug, Deserialize)]
struct GradeVerdict {
    score: String,
}

/// JSON schema restricting the grading output to a two-valued enum.
fn grade_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "score": {
                "type": "string",
                "enum": ["Yes", "No"]
            }
        },
        "required": ["score"]
    })
}

/// Model gateway backed by an LLM client and the workflow prompts.
pub struct PromptGateway {
    client: Arc<dyn LlmClient>,
    prompts: PromptSet,
    model: String,
}

impl PromptGateway {
    /// Create a gateway for a completion client and model.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client,
            prompts: PromptSet::new()?,
            model: model.into(),
        })
    }

    /// Build a deterministic (temperature 0) request from a rendered prompt.
    fn request_for(&self, rendered: RenderedPrompt) -> LlmRequest {
        let mut request = LlmRequest::new(rendered.user, &self.model).with_temperature(0.0);
        if let Some(system) = rendered.system {
            request = request.with_system(system);
        }
        request
    }
}

#[async_trait::async_trait]
impl ModelGateway for PromptGateway {
    async fn classify(&self, document: &str, question: &str) -> AppResult<Grade> {
        let rendered = self.prompts.grade(document, question)?;
        let request = self.request_for(rendered).with_format(grade_schema());

        let response = self.client.complete(&request).await?;
        let content = response.content.trim();

        let verdict: GradeVerdict = serde_json::from_str(content).map_err(|_| {
            AppError::MalformedModelOutput(format!(
                "Grading output does not match the score schema: {:?}",
                content
            ))
        })?;

        match verdict.score.as_str() {
            "Yes" => Ok(Grade::Relevant),
            "No" => Ok(Grade::NotRelevant),
            other => Err(AppError::MalformedModelOutput(format!(
                "Grading score outside Yes/No: {:?}",
                other
            ))),
        }
    }

    async fn rewrite(&self, question: &str) -> AppResult<String> {
        let rendered = self.prompts.rewrite(question)?;
        let request = self.request_for(rendered);

        let response = self.client.complete(&request).await?;

        // Models tend to wrap the reformulation in quotes; that is
        // formatting, not content.
        let text = response.content.trim().trim_matches('"').trim();

        if text.is_empty() {
            return Err(AppError::MalformedModelOutput(
                "Rewrite returned an empty question".to_string(),
            ));
        }

        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let first = lines.next().unwrap_or_default();
        if lines.next().is_some() {
            return Err(AppError::MalformedModelOutput(
                "Rewrite returned multiple candidates instead of one question".to_string(),
            ));
        }

        Ok(first.trim().to_string())
    }

    async fn answer(&self, question: &str, context: &str) -> AppResult<String> {
        let rendered = self.prompts.answer(question, context)?;
        let request = self.request_for(rendered).with_max_tokens(1000);

        let response = self.client.complete(&request).await?;
        tracing::debug!(
            "Answer synthesis used {} tokens",
            response.usage.total_tokens
        );

        let text = response.content.trim();
        if text.is_empty() {
            return Err(AppError::MalformedModelOutput(
                "Answer synthesis returned empty output".to_string(),
            ));
        }

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdoc_llm::{LlmResponse, LlmUsage};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Client that replays canned completions in order.
    struct CannedClient {
        responses: Mutex<VecDeque<String>>,
        last_request: Mutex<Option<LlmRequest>>,
    }

    impl CannedClient {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for CannedClient {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AppError::Capability("out of canned responses".to_string()))?;
            Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    fn gateway(responses: Vec<&str>) -> (PromptGateway, Arc<CannedClient>) {
        let client = Arc::new(CannedClient::new(responses));
        let gateway = PromptGateway::new(client.clone(), "test-model").unwrap();
        (gateway, client)
    }

    #[tokio::test]
    async fn test_classify_yes_maps_to_relevant() {
        let (gateway, client) = gateway(vec![r#"{"score": "Yes"}"#]);
        let grade = gateway.classify("doc", "question").await.unwrap();
        assert_eq!(grade, Grade::Relevant);

        // Classification must request schema-constrained decoding.
        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert!(request.format.is_some());
        assert_eq!(request.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_classify_no_maps_to_not_relevant() {
        let (gateway, _) = gateway(vec![r#"{"score": "No"}"#]);
        let grade = gateway.classify("doc", "question").await.unwrap();
        assert_eq!(grade, Grade::NotRelevant);
    }

    #[tokio::test]
    async fn test_classify_free_text_is_malformed() {
        let (gateway, _) = gateway(vec!["The document seems relevant to me."]);
        let result = gateway.classify("doc", "question").await;
        assert!(matches!(result, Err(AppError::MalformedModelOutput(_))));
    }

    #[tokio::test]
    async fn test_classify_out_of_enum_score_is_malformed() {
        let (gateway, _) = gateway(vec![r#"{"score": "Maybe"}"#]);
        let result = gateway.classify("doc", "question").await;
        assert!(matches!(result, Err(AppError::MalformedModelOutput(_))));
    }

    #[tokio::test]
    async fn test_rewrite_returns_single_question() {
        let (gateway, _) = gateway(vec!["\"What is the capital city of France?\"\n"]);
        let rewritten = gateway.rewrite("capital france??").await.unwrap();
        assert_eq!(rewritten, "What is the capital city of France?");
    }

    #[tokio::test]
    async fn test_rewrite_empty_is_malformed() {
        let (gateway, _) = gateway(vec!["   \n"]);
        let result = gateway.rewrite("q").await;
        assert!(matches!(result, Err(AppError::MalformedModelOutput(_))));
    }

    #[tokio::test]
    async fn test_rewrite_multi_line_is_malformed() {
        let (gateway, _) = gateway(vec!["Option A?\nOption B?"]);
        let result = gateway.rewrite("q").await;
        assert!(matches!(result, Err(AppError::MalformedModelOutput(_))));
    }

    #[tokio::test]
    async fn test_answer_passes_through_content() {
        let (gateway, _) = gateway(vec!["Paris is the capital of France."]);
        let answer = gateway.answer("What is the capital?", "context").await.unwrap();
        assert_eq!(answer, "Paris is the capital of France.");
    }

    #[tokio::test]
    async fn test_answer_empty_is_malformed() {
        let (gateway, _) = gateway(vec![""]);
        let result = gateway.answer("q", "context").await;
        assert!(matches!(result, Err(AppError::MalformedModelOutput(_))));
    }

    #[tokio::test]
    async fn test_capability_error_propagates() {
        // No canned responses left simulates an unreachable model.
        let (gateway, _) = gateway(vec![]);
        let result = gateway.classify("doc", "q").await;
        assert!(matches!(result, Err(AppError::Capability(_))));
    }
}
