//! OpenAI-compatible embedding and chat client
//!
//! This crate provides the hosted-model implementations of the `Embedder`
//! and `ChatModel` traits, plus the query/passage prefix convention for
//! asymmetric embedding model families.

mod client;
mod config;


pub use client::OpenAIClient;
pub use config::{OpenAIConfig, PrefixPolicy};

// Re-export core types for convenience
pub use insura_core::{ChatModel, ChatOptions, Embedder, Error, Result};
