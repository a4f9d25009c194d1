//! The retrieve→grade→route→(generate|rewrite|decline) state machine.
//!
//! Routing is a pure function of the session, so loop termination and the
//! relevance tie-break are testable without any I/O. The engine itself
//! only sequences capability calls; each state's side effect completes
//! before the next state is evaluated.

use crate::capability::{DocumentIndex, ModelGateway};
use crate::session::Session;
use askdoc_core::AppResult;
use std::sync::Arc;

/// Fixed sentinel answer for questions the corpus cannot address.
pub const DECLINE_MESSAGE: &str = "I can't answer that from the indexed documents.";

/// Hard cap on rewrite cycles per session. Guarantees termination even if
/// the model never grades a passage relevant. The cutoff triggers only
/// once `loop_count` has already reached this value, so a third retrieval
/// is still permitted after the second rewrite.
pub const MAX_REWRITE_CYCLES: u32 = 2;

/// Workflow states.
///
/// `Route` is a pure decision point with no side effects; `Generate` and
/// `Decline` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Retrieve,
    Grade,
    Route,
    Generate,
    Rewrite,
    Decline,
}

impl State {
    /// Whether the workflow stops after this state's effect runs.
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Generate | State::Decline)
    }
}

/// Routing decision: where to go after grading.
///
/// Relevance always wins over the loop-count cutoff: a single relevant
/// passage short-circuits further rewriting no matter how many rewrites
/// have already happened.
pub fn route(session: &Session) -> State {
    if session.has_relevant_document() {
        State::Generate
    } else if session.loop_count >= MAX_REWRITE_CYCLES {
        State::Decline
    } else {
        State::Rewrite
    }
}

/// Pure transition function: the state that follows `state` given the
/// session. Returns `None` once a terminal state has run.
pub fn next_state(state: State, session: &Session) -> Option<State> {
    match state {
        State::Retrieve => Some(State::Grade),
        State::Grade => Some(State::Route),
        State::Route => Some(route(session)),
        State::Rewrite => Some(State::Retrieve),
        State::Generate | State::Decline => None,
    }
}

/// The workflow engine.
///
/// Holds shared handles to the two capabilities. The engine is stateless
/// across runs; all per-question state lives in the [`Session`], so one
/// engine serves any number of concurrent sessions.
pub struct WorkflowEngine {
    index: Arc<dyn DocumentIndex>,
    gateway: Arc<dyn ModelGateway>,
}

impl WorkflowEngine {
    /// Create an engine from its two capabilities.
    pub fn new(index: Arc<dyn DocumentIndex>, gateway: Arc<dyn ModelGateway>) -> Self {
        Self { index, gateway }
    }

    /// The document index handle.
    pub fn index(&self) -> &dyn DocumentIndex {
        self.index.as_ref()
    }

    /// Run one complete workflow session for a question.
    ///
    /// Any capability failure aborts this session and propagates; the
    /// engine performs no retry of its own (retry policy, if any, belongs
    /// to the capability's client).
    pub async fn run(&self, question: &str) -> AppResult<Session> {
        let mut session = Session::new(question);
        let mut state = State::Retrieve;

        loop {
            tracing::debug!(
                state = ?state,
                loop_count = session.loop_count,
                "workflow step"
            );

            match state {
                State::Retrieve => {
                    session.documents = self.index.search(&session.question).await?;
                    tracing::debug!("Retrieved {} passages", session.documents.len());
                }
                State::Grade => {
                    session.grades.clear();
                    for document in &session.documents {
                        let grade = self.gateway.classify(document, &session.question).await?;
                        session.grades.push(grade);
                    }
                    debug_assert_eq!(session.grades.len(), session.documents.len());
                }
                State::Route => {
                    // Decision only; no side effects.
                }
                State::Rewrite => {
                    let rewritten = self.gateway.rewrite(&session.question).await?;
                    tracing::info!(
                        from = %session.question,
                        to = %rewritten,
                        "Rewriting question for retrieval"
                    );
                    session.question = rewritten;
                    session.loop_count += 1;
                    // Stale; fully replaced on the next retrieval.
                    session.documents.clear();
                    session.grades.clear();
                }
                State::Generate => {
                    let context = session.context();
                    let answer = self.gateway.answer(&session.question, &context).await?;
                    session.answer = Some(answer);
                }
                State::Decline => {
                    tracing::info!("No relevant passages after {} rewrites, declining", session.loop_count);
                    session.answer = Some(DECLINE_MESSAGE.to_string());
                }
            }

            match next_state(state, &session) {
                Some(next) => state = next,
                None => return Ok(session),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Grade;
    use askdoc_core::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Index with fixed passages; `has_content` is independent of whether
    /// a search matches anything.
    struct StaticIndex {
        passages: Vec<String>,
        content: bool,
        searches: AtomicU32,
    }

    impl StaticIndex {
        fn with_passages(passages: Vec<&str>) -> Self {
            Self {
                passages: passages.into_iter().map(String::from).collect(),
                content: true,
                searches: AtomicU32::new(0),
            }
        }

        fn empty_results() -> Self {
            Self {
                passages: Vec::new(),
                content: true,
                searches: AtomicU32::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl DocumentIndex for StaticIndex {
        async fn search(&self, _query: &str) -> AppResult<Vec<String>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(self.passages.clone())
        }

        async fn has_content(&self) -> AppResult<bool> {
            Ok(self.content)
        }
    }

    /// Gateway whose classify verdicts are scripted per call, in order.
    /// Once the script runs out, the last verdict repeats.
    struct ScriptedGateway {
        verdicts: Vec<Grade>,
        classifies: AtomicU32,
        rewrites: AtomicU32,
    }

    impl ScriptedGateway {
        fn new(verdicts: Vec<Grade>) -> Self {
            Self {
                verdicts,
                classifies: AtomicU32::new(0),
                rewrites: AtomicU32::new(0),
            }
        }

        fn never_relevant() -> Self {
            Self::new(vec![Grade::NotRelevant])
        }

        fn always_relevant() -> Self {
            Self::new(vec![Grade::Relevant])
        }
    }

    #[async_trait::async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn classify(&self, _document: &str, _question: &str) -> AppResult<Grade> {
            let call = self.classifies.fetch_add(1, Ordering::SeqCst) as usize;
            let verdict = self
                .verdicts
                .get(call)
                .or(self.verdicts.last())
                .copied()
                .unwrap_or(Grade::NotRelevant);
            Ok(verdict)
        }

        async fn rewrite(&self, question: &str) -> AppResult<String> {
            self.rewrites.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{} (rewritten)", question))
        }

        async fn answer(&self, _question: &str, context: &str) -> AppResult<String> {
            Ok(format!("Answer from: {}", context))
        }
    }

    fn engine(index: StaticIndex, gateway: ScriptedGateway) -> WorkflowEngine {
        WorkflowEngine::new(Arc::new(index), Arc::new(gateway))
    }

    #[test]
    fn test_route_tie_break_relevance_beats_cutoff() {
        let mut session = Session::new("q");
        session.grades = vec![Grade::NotRelevant, Grade::Relevant];
        session.loop_count = 2;

        assert_eq!(route(&session), State::Generate);
    }

    #[test]
    fn test_route_cutoff_declines() {
        let mut session = Session::new("q");
        session.grades = vec![Grade::NotRelevant];
        session.loop_count = 2;

        assert_eq!(route(&session), State::Decline);
    }

    #[test]
    fn test_route_empty_grades_rewrites_before_cutoff() {
        // Empty retrieval at loop_count 0: rewrite, not decline.
        let session = Session::new("q");
        assert_eq!(route(&session), State::Rewrite);
    }

    #[test]
    fn test_next_state_unconditional_edges() {
        let session = Session::new("q");
        assert_eq!(next_state(State::Retrieve, &session), Some(State::Grade));
        assert_eq!(next_state(State::Grade, &session), Some(State::Route));
        assert_eq!(next_state(State::Rewrite, &session), Some(State::Retrieve));
        assert_eq!(next_state(State::Generate, &session), None);
        assert_eq!(next_state(State::Decline, &session), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(State::Generate.is_terminal());
        assert!(State::Decline.is_terminal());
        assert!(!State::Route.is_terminal());
    }

    #[tokio::test]
    async fn test_grades_align_with_documents() {
        let index = StaticIndex::with_passages(vec!["a", "b", "c"]);
        let engine = engine(index, ScriptedGateway::always_relevant());

        let session = engine.run("question").await.unwrap();
        assert_eq!(session.documents.len(), 3);
        assert_eq!(session.grades.len(), 3);
    }

    #[tokio::test]
    async fn test_happy_path_generates_from_context() {
        let index = StaticIndex::with_passages(vec!["Paris is the capital of France."]);
        let engine = engine(index, ScriptedGateway::always_relevant());

        let session = engine.run("What is the capital?").await.unwrap();
        let answer = session.answer.unwrap();
        assert!(answer.contains("Paris is the capital of France."));
    }

    #[tokio::test]
    async fn test_termination_under_never_relevant_gateway() {
        let index = StaticIndex::with_passages(vec!["unrelated passage"]);
        let gateway = ScriptedGateway::never_relevant();
        let engine = WorkflowEngine::new(
            Arc::new(index),
            Arc::new(gateway),
        );

        let session = engine.run("off topic question").await.unwrap();

        // Two rewrites, then the third grading round routes to Decline.
        assert_eq!(session.loop_count, 2);
        assert_eq!(session.answer.as_deref(), Some(DECLINE_MESSAGE));
    }

    #[tokio::test]
    async fn test_third_retrieval_permitted_before_decline() {
        let index = Arc::new(StaticIndex::with_passages(vec!["unrelated"]));
        let gateway = Arc::new(ScriptedGateway::never_relevant());
        let engine = WorkflowEngine::new(index.clone(), gateway.clone());

        let session = engine.run("q").await.unwrap();

        // Initial retrieval plus one per rewrite cycle: three in total.
        assert_eq!(index.searches.load(Ordering::SeqCst), 3);
        assert_eq!(gateway.rewrites.load(Ordering::SeqCst), 2);
        assert_eq!(session.answer.as_deref(), Some(DECLINE_MESSAGE));
    }

    #[tokio::test]
    async fn test_rewrite_replaces_question_and_increments_count() {
        // Not relevant on the first pass, relevant on the second.
        let index = StaticIndex::with_passages(vec!["passage"]);
        let gateway = ScriptedGateway::new(vec![Grade::NotRelevant, Grade::Relevant]);
        let engine = engine(index, gateway);

        let session = engine.run("original question").await.unwrap();

        assert_eq!(session.loop_count, 1);
        assert_eq!(session.question, "original question (rewritten)");
        assert!(session.answer.is_some());
    }

    #[tokio::test]
    async fn test_empty_retrieval_rewrites_then_declines() {
        let index = StaticIndex::empty_results();
        let gateway = ScriptedGateway::never_relevant();
        let engine = engine(index, gateway);

        let session = engine.run("q").await.unwrap();

        // No passages ever retrieved: grades stay empty, rewrite twice,
        // then decline.
        assert!(session.documents.is_empty());
        assert!(session.grades.is_empty());
        assert_eq!(session.loop_count, 2);
        assert_eq!(session.answer.as_deref(), Some(DECLINE_MESSAGE));
    }

    /// Gateway that fails every classify call.
    struct FailingGateway;

    #[async_trait::async_trait]
    impl ModelGateway for FailingGateway {
        async fn classify(&self, _document: &str, _question: &str) -> AppResult<Grade> {
            Err(AppError::Capability("model unreachable".to_string()))
        }

        async fn rewrite(&self, _question: &str) -> AppResult<String> {
            Err(AppError::Capability("model unreachable".to_string()))
        }

        async fn answer(&self, _question: &str, _context: &str) -> AppResult<String> {
            Err(AppError::Capability("model unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_capability_failure_aborts_session() {
        let index = StaticIndex::with_passages(vec!["passage"]);
        let engine = WorkflowEngine::new(Arc::new(index), Arc::new(FailingGateway));

        let result = engine.run("q").await;
        assert!(matches!(result, Err(AppError::Capability(_))));
    }
}
