//! The retrieval engine: one canonical pipeline
//!
//! budget → vector scan → 3-tier categorical filter → dedup → keyword
//! rerank → truncate. Stateless between calls; the store and embedder are
//! injected at construction and shared read-only.

use std::collections::HashSet;
use std::sync::Arc;

use insura_core::{Embedder, Error, Result, ScoredChunk, VectorStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalizer::{COMMON_CATEGORY, normalize_insurer};
use crate::{context, query, rerank};

/// Tunables for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Over-fetch factor applied to `k` before the categorical filter.
    pub budget_multiplier: usize,
    /// Minimum candidate count regardless of `k`.
    pub budget_floor: usize,
    /// Additive bonus per matched claims keyword.
    pub keyword_bonus: f32,
    /// Whether to append the domain-synonym expansion terms to queries.
    pub expand_query: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            budget_multiplier: 4,
            budget_floor: 20,
            keyword_bonus: rerank::DEFAULT_KEYWORD_BONUS,
            expand_query: true,
        }
    }
}

/// Which filter tier produced the surviving candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterTier {
    WantedOrCommon,
    CommonOnly,
    Unfiltered,
}

/// The retrieval engine. Read-only over the store; no state between calls.
pub struct RetrievalEngine<S: VectorStore, E: Embedder> {
    store: Arc<S>,
    embedder: Arc<E>,
    config: RetrievalConfig,
}

impl<S: VectorStore, E: Embedder> RetrievalEngine<S, E> {
    pub fn new(store: Arc<S>, embedder: Arc<E>, config: RetrievalConfig) -> Self {
        Self { store, embedder, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve the best `k` chunks for a natural-language question.
    ///
    /// Cleans and (optionally) expands the question, embeds it with the
    /// query-side convention, then delegates to [`retrieve_by_vector`].
    ///
    /// [`retrieve_by_vector`]: RetrievalEngine::retrieve_by_vector
    pub async fn retrieve(
        &self,
        query_text: &str,
        category: Option<&str>,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let cleaned = query::clean(query_text);
        if cleaned.is_empty() {
            return Err(Error::InvalidInput("question is empty after cleaning".to_string()));
        }
        let embed_text =
            if self.config.expand_query { query::expand(&cleaned) } else { cleaned };
        let query_vec = self.embedder.embed(&embed_text, true).await?;
        self.retrieve_by_vector(&query_vec, category, k).await
    }

    /// Retrieve the best `k` chunks for a pre-embedded query vector.
    pub async fn retrieve_by_vector(
        &self,
        query_vec: &[f32],
        category: Option<&str>,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let expected = self.store.dimension();
        if query_vec.len() != expected {
            // Truncating or padding would produce meaningless similarity
            // scores, so a mismatch aborts the request.
            return Err(Error::Configuration(format!(
                "query vector dimension {} does not match store dimension {}",
                query_vec.len(),
                expected
            )));
        }

        let k = k.max(1);
        let budget = (k * self.config.budget_multiplier).max(self.config.budget_floor);
        let want = normalize_insurer(category);

        let candidates = self.store.scan_nearest(query_vec, budget, want.as_deref()).await?;
        let (mut kept, mut tier) = tier_filter(&candidates, want.as_deref());

        // The pushdown is best-effort and may miss spellings of the wanted
        // insurer. When tier 1 finds nothing in the hinted neighborhood, the
        // fallback tiers are defined over the unfiltered one, so re-evaluate
        // there.
        if want.is_some() && tier != FilterTier::WantedOrCommon {
            let unhinted = self.store.scan_nearest(query_vec, budget, None).await?;
            (kept, tier) = tier_filter(&unhinted, want.as_deref());
            debug!(tier = ?tier, candidates = unhinted.len(), kept = kept.len(), "rescan without category hint");
        } else {
            debug!(tier = ?tier, candidates = candidates.len(), kept = kept.len(), "category filter");
        }

        let deduped = dedupe(kept);
        let ranked = self.rerank(deduped);
        Ok(ranked.into_iter().take(k).collect())
    }

    /// Thin wrapper: retrieve and render the grounding context block.
    pub async fn retrieve_as_context(
        &self,
        query_text: &str,
        category: Option<&str>,
        k: usize,
    ) -> Result<String> {
        let chunks = self.retrieve(query_text, category, k).await?;
        Ok(context::build_context(&chunks))
    }

    /// Add the keyword bonus and re-sort, similarity-rank stable on ties.
    fn rerank(&self, mut chunks: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
        for scored in &mut chunks {
            scored.score =
                scored.similarity + rerank::bonus(&scored.chunk.content, self.config.keyword_bonus);
        }
        // Input arrives similarity-ordered; a stable sort keeps that order
        // for equal final scores.
        chunks.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
        });
        chunks
    }
}

/// Apply the 3-tier categorical filter.
///
/// Tier 1 keeps the wanted insurer plus the universal 공통 pool; tier 2
/// falls back to 공통 alone; tier 3 returns the full candidate set. An empty
/// retrieval is a worse failure mode than off-category evidence: the answer
/// layer explicitly reports "no context" to the user, so silently returning
/// nothing would degrade answers without that signal.
fn tier_filter(candidates: &[ScoredChunk], want: Option<&str>) -> (Vec<ScoredChunk>, FilterTier) {
    let Some(want) = want else {
        return (candidates.to_vec(), FilterTier::Unfiltered);
    };

    let tier1: Vec<ScoredChunk> = candidates
        .iter()
        .filter(|scored| {
            normalize_insurer(scored.chunk.category.as_deref())
                .is_some_and(|c| c == want || c == COMMON_CATEGORY)
        })
        .cloned()
        .collect();
    if !tier1.is_empty() {
        return (tier1, FilterTier::WantedOrCommon);
    }

    let tier2: Vec<ScoredChunk> = candidates
        .iter()
        .filter(|scored| {
            normalize_insurer(scored.chunk.category.as_deref())
                .is_some_and(|c| c == COMMON_CATEGORY)
        })
        .cloned()
        .collect();
    if !tier2.is_empty() {
        return (tier2, FilterTier::CommonOnly);
    }

    (candidates.to_vec(), FilterTier::Unfiltered)
}

/// Collapse chunks that cite the same physical page, keeping the first
/// (highest-similarity) occurrence.
fn dedupe(chunks: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
    #[derive(Hash, PartialEq, Eq)]
    enum PageKey {
        FilePage(String, u32),
        DocPage(i64, u32),
        DocChunk(i64, String),
    }

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(chunks.len());
    for scored in chunks {
        let chunk = &scored.chunk;
        let key = match (chunk.file_name.as_ref(), chunk.page) {
            (Some(file), Some(page)) => PageKey::FilePage(file.clone(), page),
            (None, Some(page)) => PageKey::DocPage(chunk.doc_id, page),
            // No page metadata: nothing to collapse on, keep the chunk.
            _ => PageKey::DocChunk(chunk.doc_id, chunk.chunk_id.clone()),
        };
        if seen.insert(key) {
            out.push(scored);
        }
    }
    out
}
