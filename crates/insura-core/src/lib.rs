//! Core traits and types for the insurance-policy RAG service
//!
//! This crate defines the fundamental traits and types used across the system.
//! It provides capability-facing interfaces for vector stores, embedders, and
//! chat models, making the retrieval core test-friendly and free of global
//! state: every collaborator is constructed explicitly and passed in.

pub mod chunk;
pub mod embedder;
pub mod error;
pub mod llm;
pub mod vector_store;

pub use chunk::{DocumentChunk, ScoredChunk};
pub use embedder::Embedder;
pub use error::{Error, Result};
pub use llm::{ChatModel, ChatOptions};
pub use vector_store::VectorStore;
