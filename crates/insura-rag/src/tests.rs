//! Pipeline tests for the retrieval engine

use std::sync::Arc;

use async_trait::async_trait;
use insura_core::{DocumentChunk, Embedder, Error, Result, ScoredChunk, VectorStore};
use insta::assert_yaml_snapshot;

use crate::engine::{RetrievalConfig, RetrievalEngine};
use crate::hash_embedder::HashEmbedder;
use crate::vector_store::LocalVectorStore;

const DIM: usize = 4;

/// Unit query vector; embeddings built by [`vec_with_sim`] have exactly the
/// requested cosine similarity against it.
fn query_vec() -> Vec<f32> {
    vec![1.0, 0.0, 0.0, 0.0]
}

fn vec_with_sim(sim: f32) -> Vec<f32> {
    vec![sim, (1.0 - sim * sim).sqrt(), 0.0, 0.0]
}

fn chunk(
    doc_id: i64,
    category: &str,
    file_name: &str,
    page: u32,
    content: &str,
) -> DocumentChunk {
    DocumentChunk {
        doc_id,
        chunk_id: format!("{doc_id}-{page}"),
        content: content.to_string(),
        category: Some(category.to_string()),
        clause_title: None,
        file_name: Some(file_name.to_string()),
        page: Some(page),
    }
}

fn engine(store: LocalVectorStore) -> RetrievalEngine<LocalVectorStore, HashEmbedder> {
    RetrievalEngine::new(
        Arc::new(store),
        Arc::new(HashEmbedder::new(DIM)),
        RetrievalConfig::default(),
    )
}

/// Store with canned hinted and unhinted scan results, for exercising the
/// engine's behavior when a pushdown returns a degraded neighborhood.
struct CannedStore {
    hinted: Vec<ScoredChunk>,
    unhinted: Vec<ScoredChunk>,
}

#[async_trait]
impl VectorStore for CannedStore {
    async fn scan_nearest(
        &self,
        _query: &[f32],
        limit: usize,
        category_hint: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let rows = if category_hint.is_some() { &self.hinted } else { &self.unhinted };
        Ok(rows.iter().take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.unhinted.len())
    }

    async fn healthy(&self) -> bool {
        true
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

#[tokio::test]
async fn test_dimension_mismatch_fails_fast() {
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "공통", "a.pdf", 1, "alpha"), Some(vec_with_sim(0.9))).unwrap();
    let engine = engine(store);

    let err = engine.retrieve_by_vector(&[1.0, 0.0, 0.0], None, 3).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn test_budget_recovers_filtered_category() {
    // The wanted chunks rank far below 25 off-category fillers; the
    // over-fetch budget plus the category filter must still surface them.
    let store = LocalVectorStore::new(DIM);
    for i in 0..25 {
        let sim = 0.99 - i as f32 * 0.001;
        store
            .insert(chunk(100 + i, "기타", "filler.pdf", i as u32, "filler"), Some(vec_with_sim(sim)))
            .unwrap();
    }
    store.insert(chunk(1, "삼성화재", "s.pdf", 1, "alpha"), Some(vec_with_sim(0.20))).unwrap();
    store.insert(chunk(2, "삼성화재", "s.pdf", 2, "bravo"), Some(vec_with_sim(0.19))).unwrap();
    store.insert(chunk(3, "삼성화재", "s.pdf", 3, "charlie"), Some(vec_with_sim(0.18))).unwrap();
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), Some("삼성화재"), 3).await.unwrap();
    assert_eq!(results.len(), 3);
    for scored in &results {
        assert_eq!(scored.chunk.category.as_deref(), Some("삼성화재"));
    }
    assert_eq!(results[0].chunk.doc_id, 1);
}

#[tokio::test]
async fn test_fallback_to_common_only() {
    // No chunks of the requested insurer: only 공통 chunks come back, never
    // the higher-similarity off-category ones, and never an empty set.
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "삼성화재", "s.pdf", 1, "off-category"), Some(vec_with_sim(0.95))).unwrap();
    store.insert(chunk(2, "공통", "std.pdf", 1, "standard form"), Some(vec_with_sim(0.5))).unwrap();
    store.insert(chunk(3, "공통", "std.pdf", 2, "standard form too"), Some(vec_with_sim(0.4))).unwrap();
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), Some("현대해상"), 5).await.unwrap();
    assert_eq!(results.len(), 2);
    for scored in &results {
        assert_eq!(scored.chunk.category.as_deref(), Some("공통"));
    }
}

#[tokio::test]
async fn test_alias_variant_category_survives_hint() {
    // Stored raw category "동부화재" is an alias of the requested "DB손해":
    // it must rank alongside 공통, not vanish in the scan pushdown before
    // the categorical filter sees it.
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "동부화재", "db.pdf", 1, "alpha"), Some(vec_with_sim(0.9))).unwrap();
    store.insert(chunk(2, "공통", "std.pdf", 1, "bravo"), Some(vec_with_sim(0.5))).unwrap();
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), Some("DB손해"), 5).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.category.as_deref(), Some("동부화재"));
    assert_eq!(results[1].chunk.category.as_deref(), Some("공통"));
}

#[tokio::test]
async fn test_tier_fallback_reevaluates_without_hint() {
    // A pushdown can return oddly-categorized rows while missing eligible
    // ones. When the hinted neighborhood has no wanted-or-공통 candidates
    // the tiers must be re-evaluated over the unhinted neighborhood instead
    // of serving the hinted leftovers.
    let odd = ScoredChunk::new(chunk(1, "기타", "misc.pdf", 1, "alpha"), 0.9);
    let common = ScoredChunk::new(chunk(2, "공통", "std.pdf", 1, "bravo"), 0.5);
    let store = CannedStore { hinted: vec![odd.clone()], unhinted: vec![odd, common] };
    let engine = RetrievalEngine::new(
        Arc::new(store),
        Arc::new(HashEmbedder::new(DIM)),
        RetrievalConfig::default(),
    );

    let results = engine.retrieve_by_vector(&query_vec(), Some("현대해상"), 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.category.as_deref(), Some("공통"));
}

#[tokio::test]
async fn test_total_fallback_when_nothing_matches() {
    // Neither the wanted insurer nor 공통 exists: better off-category
    // evidence than none at all.
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "삼성화재", "s.pdf", 1, "alpha"), Some(vec_with_sim(0.9))).unwrap();
    store.insert(chunk(2, "삼성화재", "s.pdf", 2, "bravo"), Some(vec_with_sim(0.8))).unwrap();
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), Some("현대해상"), 3).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.doc_id, 1);
}

#[tokio::test]
async fn test_dedup_keeps_higher_similarity() {
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "공통", "a.pdf", 7, "first fragment"), Some(vec_with_sim(0.9))).unwrap();
    let mut twin = chunk(1, "공통", "a.pdf", 7, "second fragment");
    twin.chunk_id = "1-7b".to_string();
    store.insert(twin, Some(vec_with_sim(0.8))).unwrap();
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), None, 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.content, "first fragment");
    assert!((results[0].similarity - 0.9).abs() < 1e-3);
}

#[tokio::test]
async fn test_null_embeddings_excluded() {
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "공통", "a.pdf", 1, "backfilled"), Some(vec_with_sim(0.5))).unwrap();
    store.insert(chunk(2, "공통", "a.pdf", 2, "awaiting backfill"), None).unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), None, 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.doc_id, 1);
}

#[tokio::test]
async fn test_keyword_bonus_can_reorder_close_neighbors() {
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "공통", "a.pdf", 1, "plain text"), Some(vec_with_sim(0.80))).unwrap();
    store
        .insert(chunk(2, "공통", "a.pdf", 2, "진단서와 영수증 안내"), Some(vec_with_sim(0.79)))
        .unwrap();
    let engine = engine(store);

    // Two keyword hits are worth 0.06: enough to overtake a 0.01 similarity
    // gap, so the procedural chunk wins.
    let results = engine.retrieve_by_vector(&query_vec(), None, 2).await.unwrap();
    assert_eq!(results[0].chunk.doc_id, 2);
    assert_eq!(results[1].chunk.doc_id, 1);
}

#[tokio::test]
async fn test_equal_scores_keep_similarity_order() {
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "공통", "a.pdf", 1, "alpha"), Some(vec_with_sim(0.5))).unwrap();
    store.insert(chunk(2, "공통", "a.pdf", 2, "bravo"), Some(vec_with_sim(0.5))).unwrap();
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), None, 2).await.unwrap();
    assert_eq!(results[0].chunk.doc_id, 1);
    assert_eq!(results[1].chunk.doc_id, 2);
}

#[tokio::test]
async fn test_non_positive_k_clamps_to_one() {
    let store = LocalVectorStore::new(DIM);
    store.insert(chunk(1, "공통", "a.pdf", 1, "alpha"), Some(vec_with_sim(0.9))).unwrap();
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), None, 0).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_mixed_category_ranking_scenario() {
    // Store: insurer "A" at [0.9, 0.8, 0.7, 0.6, 0.5], 공통 at
    // [0.95, 0.4, 0.3]. With k=3 and category "A" the expected order is
    // 0.95 (공통), 0.9 (A), 0.8 (A).
    let store = LocalVectorStore::new(DIM);
    for (i, sim) in [0.9f32, 0.8, 0.7, 0.6, 0.5].into_iter().enumerate() {
        store
            .insert(chunk(10 + i as i64, "A", "a.pdf", i as u32, "alpha"), Some(vec_with_sim(sim)))
            .unwrap();
    }
    for (i, sim) in [0.95f32, 0.4, 0.3].into_iter().enumerate() {
        store
            .insert(
                chunk(20 + i as i64, "공통", "std.pdf", i as u32, "bravo"),
                Some(vec_with_sim(sim)),
            )
            .unwrap();
    }
    let engine = engine(store);

    let results = engine.retrieve_by_vector(&query_vec(), Some("A"), 3).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].chunk.category.as_deref(), Some("공통"));
    assert!((results[0].similarity - 0.95).abs() < 1e-3);
    assert_eq!(results[1].chunk.category.as_deref(), Some("A"));
    assert!((results[1].similarity - 0.9).abs() < 1e-3);
    assert_eq!(results[2].chunk.category.as_deref(), Some("A"));
    assert!((results[2].similarity - 0.8).abs() < 1e-3);
}

#[tokio::test]
async fn test_retrieve_text_round_trip() {
    // End to end over the hash embedder: the chunk embedded from the same
    // text as the query must come back first.
    let embedder = HashEmbedder::new(16);
    let store = LocalVectorStore::new(16);
    for (i, text) in ["실손 청구 안내", "자동차 사고 접수", "화재 피해 신고"].iter().enumerate() {
        let embedding = embedder.embed(text, false).await.unwrap();
        store.insert(chunk(i as i64, "공통", "g.pdf", i as u32, text), Some(embedding)).unwrap();
    }
    let mut config = RetrievalConfig::default();
    config.expand_query = false;
    let engine = RetrievalEngine::new(Arc::new(store), Arc::new(embedder), config);

    let results = engine.retrieve("자동차 사고 접수", None, 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.content, "자동차 사고 접수");
}

#[tokio::test]
async fn test_empty_question_rejected() {
    let store = LocalVectorStore::new(DIM);
    let engine = engine(store);
    let err = engine.retrieve("  [ ] ", None, 3).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_default_config_snapshot() {
    let config = RetrievalConfig::default();
    assert_yaml_snapshot!(config, @r###"
    ---
    budget_multiplier: 4
    budget_floor: 20
    keyword_bonus: 0.03
    expand_query: true
    "###);
}
