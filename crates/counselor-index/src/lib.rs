//! Knowledge index: passage model, keyword retrieval, and corpus loading.
//!
//! The pipeline only depends on the [`KnowledgeIndex`] trait — an opaque
//! ranked-retrieval service. The provided implementation is [`KeywordIndex`],
//! a BM25 inverted index over passages built from a data directory of
//! structured-fact JSON files and free-text documents.
//!
//! # Main types
//!
//! - [`Passage`] / [`SourceTag`] — A retrieved chunk of source text.
//! - [`KnowledgeIndex`] — Trait for ranked passage retrieval.
//! - [`KeywordIndex`] — In-process BM25 implementation.
//! - [`FactRecord`] — Tagged union of known structured-fact categories.
//! - [`build_index`] — Loads a data directory into a [`KeywordIndex`].

/// BM25 inverted index internals.
pub mod bm25;
/// Structured-fact record categories.
pub mod facts;
/// The keyword-backed index implementation.
pub mod keyword;
/// Data-directory loading and text chunking.
pub mod loader;
/// Passage model and the retrieval trait.
pub mod passage;

pub use facts::FactRecord;
pub use keyword::KeywordIndex;
pub use loader::build_index;
pub use passage::{KnowledgeIndex, Passage, SourceTag};
