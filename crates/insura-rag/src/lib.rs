//! Retrieval engine for the insurance-policy RAG service
//!
//! This crate is the single source of truth for the retrieval pipeline:
//! over-fetch → categorical filter with 3-tier fallback → dedup → keyword
//! rerank → truncate. It also provides the insurer-name normalizer, query
//! cleaning/expansion, the context/prompt formatter, and the vector store
//! implementations (Qdrant for production, in-memory for tests and offline
//! runs).

pub mod context;
pub mod engine;
pub mod hash_embedder;
pub mod normalizer;
pub mod query;
pub mod rerank;
pub mod vector_store;

#[cfg(test)]
mod tests;

pub use engine::{RetrievalConfig, RetrievalEngine};
pub use hash_embedder::HashEmbedder;
pub use normalizer::{COMMON_CATEGORY, normalize_insurer};
pub use vector_store::{LocalVectorStore, QdrantVectorStore};

// Re-export core types for convenience
pub use insura_core::{DocumentChunk, Embedder, Error, Result, ScoredChunk, VectorStore};
