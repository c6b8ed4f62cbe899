use crate::bm25::Bm25Index;
use crate::passage::{KnowledgeIndex, Passage, SourceTag};
use async_trait::async_trait;
use counselor_core::CounselorResult;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredPassage {
    text: String,
    source: SourceTag,
}

struct Inner {
    bm25: Bm25Index,
    passages: HashMap<Uuid, StoredPassage>,
}

/// In-process keyword index backed by BM25 scoring.
///
/// Passages are inserted during startup indexing; queries only take the read
/// lock, so concurrent request handling never contends once the corpus is
/// loaded.
pub struct KeywordIndex {
    inner: RwLock<Inner>,
}

impl KeywordIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                bm25: Bm25Index::new(),
                passages: HashMap::new(),
            }),
        }
    }

    /// Insert a passage, returning its assigned id.
    pub async fn insert(&self, text: impl Into<String>, source: SourceTag) -> Uuid {
        let text = text.into();
        let id = Uuid::new_v4();
        let mut inner = self.inner.write().await;
        inner.bm25.add(id, &text);
        inner.passages.insert(id, StoredPassage { text, source });
        id
    }

    /// Number of indexed passages.
    pub async fn len(&self) -> usize {
        self.inner.read().await.passages.len()
    }

    /// Whether the index holds no passages.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.passages.is_empty()
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeIndex for KeywordIndex {
    async fn search(&self, query: &str, k: usize) -> CounselorResult<Vec<Passage>> {
        let inner = self.inner.read().await;
        let hits = inner.bm25.search(query, k);
        Ok(hits
            .into_iter()
            .filter_map(|(id, score)| {
                inner.passages.get(&id).map(|p| Passage {
                    id,
                    text: p.text.clone(),
                    source: p.source,
                    score,
                })
            })
            .collect())
    }
}
