//! Embedder trait

use async_trait::async_trait;

use crate::Result;

/// Trait for text embedders.
///
/// The `is_query` flag is a correctness-critical contract: model families
/// such as e5/bge were trained with asymmetric "query: " / "passage: "
/// prefixes, and embedding a query with the passage convention silently
/// degrades similarity quality without raising an error. The retrieval
/// engine always passes `is_query = true`; the ingestion pipeline embedded
/// chunks with `is_query = false`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text into a fixed-dimension vector.
    async fn embed(&self, text: &str, is_query: bool) -> Result<Vec<f32>>;

    /// Output dimension, constant for a given model version.
    fn dimension(&self) -> usize;
}
