//! Ask command handler.
//!
//! Wires the document index and model gateway into the workflow engine
//! and runs one session per question.

use askdoc_core::{config::AppConfig, AppResult};
use askdoc_index::{create_provider, DocumentStore, Retriever};
use askdoc_llm::create_client;
use askdoc_workflow::{run_batch, BatchItem, PromptGateway, WorkflowEngine};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Ask one or more questions against the indexed corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question(s) to ask
    #[arg(required = true)]
    pub questions: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// One question's result in the JSON report.
#[derive(Debug, Serialize)]
struct AnswerReport {
    question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Answering {} question(s)", self.questions.len());

        // Document index capability: opened once, injected by handle.
        let store = DocumentStore::open(config.index_dir())?;
        let embedder = create_provider(
            &config.embedding.provider,
            &config.embedding.model,
            config.embedding.dimensions,
            config.endpoint.as_deref(),
        )?;
        let retriever = Retriever::new(store, embedder, config.retrieval.top_k);

        // Model gateway capability.
        let client = create_client(&config.provider, config.endpoint.as_deref())?;
        let gateway = PromptGateway::new(client, &config.model)?;

        let engine = WorkflowEngine::new(Arc::new(retriever), Arc::new(gateway));

        let results = run_batch(&engine, &self.questions, config.retrieval.parallelism).await?;

        if self.json {
            self.print_json(&results)?;
        } else {
            self.print_text(&results);
        }

        Ok(())
    }

    fn print_json(&self, results: &[BatchItem]) -> AppResult<()> {
        let reports: Vec<AnswerReport> = results
            .iter()
            .map(|item| match &item.outcome {
                Ok(answer) => AnswerReport {
                    question: item.question.clone(),
                    answer: Some(answer.clone()),
                    error: None,
                },
                Err(e) => AnswerReport {
                    question: item.question.clone(),
                    answer: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&reports)?);
        Ok(())
    }

    fn print_text(&self, results: &[BatchItem]) {
        for item in results {
            println!("Q: {}", item.question);
            match &item.outcome {
                Ok(answer) => println!("A: {}\n", answer),
                Err(e) => println!("Error: {}\n", e),
            }
        }
    }
}
