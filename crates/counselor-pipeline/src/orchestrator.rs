use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use counselor_core::{CounselorResult, Message};
use counselor_index::KnowledgeIndex;
use counselor_model::ModelClient;
use counselor_rules::{GuardrailClassifier, LinkScorer};
use counselor_session::{normalize_session_id, SessionStore};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Tunables for the per-turn pipeline. All values are configuration, not
/// business logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Passages retrieved per turn.
    pub top_k: usize,
    /// Most recent session messages included in the prompt.
    pub history_window: usize,
    /// System instruction for the model.
    pub system_prompt: String,
    /// Static apology returned when the model call fails.
    pub fallback_answer: String,
    /// Reply to an empty utterance.
    pub empty_input_reply: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            history_window: 6,
            system_prompt: SYSTEM_PROMPT.to_string(),
            fallback_answer: "I ran into a problem while working on your question. Please try \
                              asking again in a moment — I'm here to help with Green Level \
                              High School topics!"
                .to_string(),
            empty_input_reply: "I'm here to help! Please ask me a question about Green Level \
                                High School."
                .to_string(),
        }
    }
}

/// The finished turn: the markdown answer and the session it belongs to.
///
/// Any attached reference link is embedded in `answer` as a markdown link,
/// never surfaced as a separate field.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    /// Final answer text, markdown.
    pub answer: String,
    /// The (normalized) session identifier the turn was recorded under.
    pub session_id: String,
}

/// Composes the guardrail classifier, knowledge index, model client, link
/// scorer, and session store into the per-turn pipeline.
///
/// Exactly one of {guardrail short-circuit, retrieval + generation} runs per
/// turn, and the guardrail check always comes first. Requests are independent;
/// the session store is the only shared mutable state.
pub struct Orchestrator {
    index: Arc<dyn KnowledgeIndex>,
    model: ModelClient,
    sessions: Arc<dyn SessionStore>,
    guardrails: GuardrailClassifier,
    links: LinkScorer,
    config: PipelineConfig,
    model_failures: AtomicU64,
}

impl Orchestrator {
    /// Wire up a pipeline from its collaborators.
    pub fn new(
        index: Arc<dyn KnowledgeIndex>,
        model: ModelClient,
        sessions: Arc<dyn SessionStore>,
        guardrails: GuardrailClassifier,
        links: LinkScorer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            index,
            model,
            sessions,
            guardrails,
            links,
            config,
            model_failures: AtomicU64::new(0),
        }
    }

    /// Number of model-call failures since startup. Failed turns are counted
    /// even though the caller only ever sees the fallback answer.
    pub fn model_failure_count(&self) -> u64 {
        self.model_failures.load(Ordering::Relaxed)
    }

    /// Run one turn: classify, retrieve, generate, score, persist.
    pub async fn answer(&self, session_id: &str, question: &str) -> CounselorResult<TurnReply> {
        let session_id = normalize_session_id(session_id);
        let question = question.trim();

        if question.is_empty() {
            return Ok(TurnReply {
                answer: self.config.empty_input_reply.clone(),
                session_id,
            });
        }

        // Guardrails run before retrieval and are exclusive with it.
        if let Some(outcome) = self.guardrails.classify(question) {
            info!(session_id = %session_id, outcome = outcome_tag(&outcome), "Guardrail short-circuit");
            let answer = outcome.response().to_string();
            self.persist_turn(&session_id, question, &answer).await;
            return Ok(TurnReply { answer, session_id });
        }

        // Retrieval is best-effort: an index failure degrades to empty context.
        let passages = match self.index.search(question, self.config.top_k).await {
            Ok(passages) => passages,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Retrieval failed, continuing with empty context");
                Vec::new()
            }
        };

        let mut messages = self
            .sessions
            .history(&session_id, self.config.history_window)
            .await;
        messages.push(Message::user(build_user_prompt(&passages, question)));

        let answer = match self.model.complete(&self.config.system_prompt, &messages).await {
            Ok(answer) => answer,
            Err(e) => {
                // Count the failed attempt, but do not refresh the session as
                // if the turn succeeded. The caller may simply resubmit.
                self.model_failures.fetch_add(1, Ordering::Relaxed);
                warn!(session_id = %session_id, error = %e, "Model call failed, returning fallback");
                return Ok(TurnReply {
                    answer: self.config.fallback_answer.clone(),
                    session_id,
                });
            }
        };

        // Links are injected here and only here; model output is untrusted
        // for link content.
        let answer = match self.links.score(question, &answer) {
            Some(hit) => {
                info!(session_id = %session_id, category = %hit.category, score = hit.score, "Attaching reference link");
                format!("{answer}\n\n{}", hit.to_markdown())
            }
            None => answer,
        };

        self.persist_turn(&session_id, question, &answer).await;
        Ok(TurnReply { answer, session_id })
    }

    async fn persist_turn(&self, session_id: &str, question: &str, answer: &str) {
        self.sessions
            .append(
                session_id,
                vec![Message::user(question), Message::assistant(answer)],
            )
            .await;
    }
}

fn outcome_tag(outcome: &counselor_rules::GuardrailOutcome) -> &'static str {
    match outcome {
        counselor_rules::GuardrailOutcome::Safety(_) => "safety",
        counselor_rules::GuardrailOutcome::Greeting(_) => "greeting",
        counselor_rules::GuardrailOutcome::OutOfScope(_) => "out_of_scope",
    }
}
