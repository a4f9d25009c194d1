//! The grading, rewriting, and answering templates.

use askdoc_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde_json::json;

/// System instruction for the relevance grader.
const GRADE_SYSTEM: &str = "You are a grader assessing the relevance of a retrieved \
document to a user question. If the document contains keywords or semantic meaning \
related to the question, grade it as relevant. Give a binary score 'Yes' or 'No' to \
indicate whether the document is relevant to the question.";

/// User message template for the relevance grader.
const GRADE_USER: &str = "Retrieved document:\n\n{{document}}\n\nUser question: {{question}}";

/// System instruction for the question rewriter.
const REWRITE_SYSTEM: &str = "You are a question re-writer that converts an input \
question to a better version that is optimized for retrieval. Look at the input and \
reason about the underlying semantic intent. Respond with the improved question only, \
on a single line, with no commentary.";

/// User message template for the question rewriter.
const REWRITE_USER: &str =
    "Here is the initial question:\n\n{{question}}\n\nFormulate an improved question.";

/// User message template for answer synthesis.
///
/// Instructs the model to stay inside the supplied context and to state
/// explicitly when the context does not contain the answer, rather than
/// inventing one.
const ANSWER_USER: &str = "Answer the question based only on the following context. \
If the context does not contain the answer, reply exactly: \
\"I could not find this information in the available documents.\"\n\n\
Context:\n{{context}}\n\nQuestion: {{question}}";

/// A rendered prompt ready for LLM execution.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,
}

/// The set of workflow prompt templates, registered once.
pub struct PromptSet {
    handlebars: Handlebars<'static>,
}

impl PromptSet {
    /// Create a prompt set with all workflow templates registered.
    pub fn new() -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        // Plain text prompts, no HTML escaping
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            ("grade", GRADE_USER),
            ("rewrite", REWRITE_USER),
            ("answer", ANSWER_USER),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| {
                    AppError::Prompt(format!("Failed to register template '{}': {}", name, e))
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Render the relevance-grading prompt for one document.
    pub fn grade(&self, document: &str, question: &str) -> AppResult<RenderedPrompt> {
        let user = self.render(
            "grade",
            &json!({ "document": document, "question": question }),
        )?;
        Ok(RenderedPrompt {
            system: Some(GRADE_SYSTEM.to_string()),
            user,
        })
    }

    /// Render the question-rewriting prompt.
    pub fn rewrite(&self, question: &str) -> AppResult<RenderedPrompt> {
        let user = self.render("rewrite", &json!({ "question": question }))?;
        Ok(RenderedPrompt {
            system: Some(REWRITE_SYSTEM.to_string()),
            user,
        })
    }

    /// Render the answer-synthesis prompt.
    pub fn answer(&self, question: &str, context: &str) -> AppResult<RenderedPrompt> {
        let user = self.render(
            "answer",
            &json!({ "question": question, "context": context }),
        )?;
        Ok(RenderedPrompt { system: None, user })
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> AppResult<String> {
        self.handlebars
            .render(name, data)
            .map_err(|e| AppError::Prompt(format!("Failed to render template '{}': {}", name, e)))
    }
}
