use async_trait::async_trait;
use counselor_core::CounselorResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a passage originated: a structured-fact record or a free-text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    /// Rendered from a structured-fact JSON record.
    Fact,
    /// A chunk of a free-text document.
    Document,
}

/// A chunk of indexed source text returned by a retrieval query.
///
/// Ephemeral: produced per query with its relevance score filled in, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Stable identifier of the underlying chunk.
    pub id: Uuid,
    /// The passage text.
    pub text: String,
    /// Origin of the passage.
    pub source: SourceTag,
    /// Relevance score for the query that produced it; higher is more relevant.
    pub score: f32,
}

/// Ranked passage retrieval over an indexed knowledge base.
///
/// Implementations must be idempotent for identical query text against an
/// unchanged index: scores and rank order are deterministic. Returning fewer
/// than `k` results (including none) is a valid outcome, not an error.
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    /// Return the top-`k` most relevant passages for `query`, best score first.
    async fn search(&self, query: &str, k: usize) -> CounselorResult<Vec<Passage>>;
}
