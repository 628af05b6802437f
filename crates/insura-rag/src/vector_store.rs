//! Vector store implementations
//!
//! `QdrantVectorStore` is the production store over a Qdrant collection of
//! pre-embedded policy chunks. `LocalVectorStore` is an in-memory stand-in
//! with the same contract, used by tests and offline runs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use insura_core::{DocumentChunk, Error, Result, ScoredChunk, VectorStore};
use qdrant_client::Qdrant;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{Condition, Filter, SearchPointsBuilder, Value};
use tracing::warn;

use crate::normalizer::{COMMON_CATEGORY, alias_variants, normalize_insurer};

/// Qdrant-backed chunk store.
///
/// Points carry the chunk fields as payload (`doc_id`, `chunk_id`,
/// `content`, `category`, `clause_title`, `file_name`, `page`). Chunks whose
/// embedding has not been backfilled are never upserted as points, so the
/// null-embedding exclusion holds by construction here.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    pub fn new(url: &str, collection: impl Into<String>, dimension: usize) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| Error::Configuration(format!("qdrant client: {e}")))?;
        Ok(Self { client, collection: collection.into(), dimension })
    }

    fn chunk_from_payload(payload: &HashMap<String, Value>) -> Option<DocumentChunk> {
        let content = payload_str(payload, "content")?;
        Some(DocumentChunk {
            doc_id: payload_i64(payload, "doc_id").unwrap_or_default(),
            chunk_id: payload_str(payload, "chunk_id").unwrap_or_default(),
            content,
            category: payload_str(payload, "category"),
            clause_title: payload_str(payload, "clause_title"),
            file_name: payload_str(payload, "file_name"),
            page: payload_i64(payload, "page").and_then(|p| u32::try_from(p).ok()),
        })
    }
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::IntegerValue(i)) => Some(*i),
        _ => None,
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn scan_nearest(
        &self,
        query: &[f32],
        limit: usize,
        category_hint: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let mut request =
            SearchPointsBuilder::new(self.collection.as_str(), query.to_vec(), limit as u64)
                .with_payload(true);

        // Coarse pushdown only. Payload categories are raw text, so the
        // hint expands to every recorded alias spelling, plus the 공통
        // spellings so the universal pool stays eligible. The engine still
        // re-evaluates the tiers without the hint when the hinted
        // neighborhood has no wanted-or-공통 candidates.
        if let Some(hint) = category_hint {
            let mut spellings = vec![hint];
            spellings.extend_from_slice(alias_variants(hint));
            spellings.extend_from_slice(alias_variants(COMMON_CATEGORY));
            let conditions: Vec<Condition> = spellings
                .into_iter()
                .map(|s| Condition::matches("category", s.to_string()))
                .collect();
            request = request.filter(Filter::should(conditions));
        }

        let response = self
            .client
            .search_points(request)
            .await
            .map_err(|e| Error::RetrievalUnavailable(format!("qdrant search: {e}")))?;

        let mut out = Vec::with_capacity(response.result.len());
        for point in response.result {
            match Self::chunk_from_payload(&point.payload) {
                Some(chunk) => out.push(ScoredChunk::new(chunk, point.score)),
                None => warn!(collection = %self.collection, "point without content payload, skipping"),
            }
        }
        Ok(out)
    }

    async fn count(&self) -> Result<usize> {
        let info = self
            .client
            .collection_info(self.collection.as_str())
            .await
            .map_err(|e| Error::RetrievalUnavailable(format!("qdrant collection info: {e}")))?;
        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0) as usize)
    }

    async fn healthy(&self) -> bool {
        self.client.health_check().await.is_ok()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// In-memory vector store for tests and offline runs.
///
/// Rows keep insertion order; ties in similarity therefore resolve
/// deterministically. Chunks inserted without an embedding model the
/// ingestion backfill window and are excluded from every scan.
pub struct LocalVectorStore {
    rows: RwLock<Vec<(DocumentChunk, Option<Vec<f32>>)>>,
    dimension: usize,
}

impl LocalVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self { rows: RwLock::new(Vec::new()), dimension }
    }

    /// Insert a chunk, optionally with its embedding.
    pub fn insert(&self, chunk: DocumentChunk, embedding: Option<Vec<f32>>) -> Result<()> {
        if let Some(vec) = &embedding {
            if vec.len() != self.dimension {
                return Err(Error::Configuration(format!(
                    "embedding dimension {} does not match store dimension {}",
                    vec.len(),
                    self.dimension
                )));
            }
        }
        let mut rows = self
            .rows
            .write()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {e}")))?;
        rows.push((chunk, embedding));
        Ok(())
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn scan_nearest(
        &self,
        query: &[f32],
        limit: usize,
        category_hint: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let rows = self
            .rows
            .read()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {e}")))?;

        // Stored categories are raw text; the hint comparison runs over
        // normalized forms so alias spellings of the hinted insurer survive
        // the pushdown.
        let want = category_hint.and_then(|hint| normalize_insurer(Some(hint)));

        let mut scored: Vec<ScoredChunk> = rows
            .iter()
            .filter_map(|(chunk, embedding)| {
                let embedding = embedding.as_ref()?;
                if let Some(want) = want.as_deref() {
                    let matches_hint = normalize_insurer(chunk.category.as_deref())
                        .is_some_and(|c| c == want || c == COMMON_CATEGORY);
                    if !matches_hint {
                        return None;
                    }
                }
                let similarity = Self::cosine_similarity(query, embedding);
                Some(ScoredChunk::new(chunk.clone(), similarity))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        let rows = self
            .rows
            .read()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {e}")))?;
        Ok(rows.iter().filter(|(_, embedding)| embedding.is_some()).count())
    }

    async fn healthy(&self) -> bool {
        true
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
