//! Document chunk types
//!
//! A chunk is the atomic retrievable unit: a fragment of a policy document
//! with the metadata needed for filtering (category) and display (clause
//! title, file name, page). Chunks are written by the ingestion pipeline and
//! are strictly read-only here.

use serde::{Deserialize, Serialize};

/// A fragment of a source policy document.
///
/// `(doc_id, chunk_id)` is unique per chunk. `category` is free text at write
/// time (an insurer name or the universal 공통 bucket) and must be normalized
/// before any comparison. `clause_title`, `file_name`, and `page` are display
/// metadata only, never used for ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub doc_id: i64,
    pub chunk_id: String,
    pub content: String,
    pub category: Option<String>,
    pub clause_title: Option<String>,
    pub file_name: Option<String>,
    pub page: Option<u32>,
}

/// A chunk paired with its query-time scores.
///
/// `similarity` is `1 - distance` from the vector scan; `score` adds the
/// keyword-rerank bonus on top. Both are computed per query, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub similarity: f32,
    pub score: f32,
}

impl ScoredChunk {
    /// Wrap a chunk fresh off the vector scan, before reranking.
    pub fn new(chunk: DocumentChunk, similarity: f32) -> Self {
        Self { chunk, similarity, score: similarity }
    }
}
