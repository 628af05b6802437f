//! API request/response schemas
//!
//! The contract with the frontend: field names and defaults follow the
//! original service so existing clients keep working. `top_k` and
//! `max_tokens` are clamped, not rejected, matching the engine's policy of
//! never failing a request over a fixable bound.

use insura_core::ScoredChunk;
use serde::{Deserialize, Serialize};

const TOP_K_DEFAULT: i64 = 8;
const TOP_K_MAX: i64 = 20;
const MAX_TOKENS_DEFAULT: u32 = 600;
const MAX_TOKENS_MIN: u32 = 100;
const MAX_TOKENS_MAX: u32 = 2000;

fn default_top_k() -> i64 {
    TOP_K_DEFAULT
}

fn default_max_tokens() -> u32 {
    MAX_TOKENS_DEFAULT
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Insurer filter; free text, normalized server-side.
    pub policy_type: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl AskRequest {
    pub fn top_k_clamped(&self) -> usize {
        self.top_k.clamp(1, TOP_K_MAX) as usize
    }

    pub fn max_tokens_clamped(&self) -> u32 {
        self.max_tokens.clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub question: String,
    pub policy_type: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

impl SearchRequest {
    pub fn top_k_clamped(&self) -> usize {
        self.top_k.clamp(1, TOP_K_MAX) as usize
    }
}

/// Citation metadata surfaced to the UI alongside an answer.
#[derive(Debug, Clone, Serialize)]
pub struct SourceItem {
    pub doc_id: i64,
    pub chunk_id: String,
    pub clause_title: Option<String>,
    pub file_name: Option<String>,
    pub page: Option<u32>,
    pub content: String,
    pub score: f32,
}

impl From<&ScoredChunk> for SourceItem {
    fn from(scored: &ScoredChunk) -> Self {
        let chunk = &scored.chunk;
        Self {
            doc_id: chunk.doc_id,
            chunk_id: chunk.chunk_id.clone(),
            clause_title: chunk.clause_title.clone(),
            file_name: chunk.file_name.clone(),
            page: chunk.page,
            content: chunk.content.clone(),
            score: scored.score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: Vec<SourceItem>,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SourceItem>,
}
