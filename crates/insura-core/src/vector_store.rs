//! Vector store trait
//!
//! The retrieval core needs exactly one primitive from the store: a
//! nearest-neighbor scan ordered by vector distance. Everything else
//! (filter tiers, dedup, rerank) happens above this boundary.

use async_trait::async_trait;

use crate::{Result, ScoredChunk};

/// Trait for vector stores (Qdrant in production, in-memory for tests).
///
/// Implementations must exclude chunks whose embedding has not been
/// backfilled yet, and must report an unreachable backend as
/// [`Error::RetrievalUnavailable`](crate::Error::RetrievalUnavailable) so
/// callers can tell "the store is broken" from "nothing matched".
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the `limit` chunks nearest to `query`, similarity descending.
    ///
    /// `category_hint` is a coarse pre-filter pushed into the scan for
    /// efficiency. It is an optimization only: the correctness-bearing
    /// categorical filter runs in the retrieval engine, and the engine will
    /// rescan without the hint when the filtered candidates come up empty.
    async fn scan_nearest(
        &self,
        query: &[f32],
        limit: usize,
        category_hint: Option<&str>,
    ) -> Result<Vec<ScoredChunk>>;

    /// Total number of searchable chunks.
    async fn count(&self) -> Result<usize>;

    /// Backend reachability, for health reporting.
    async fn healthy(&self) -> bool;

    /// The embedding dimension this store was configured with.
    fn dimension(&self) -> usize;
}
