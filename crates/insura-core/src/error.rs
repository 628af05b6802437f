//! Error types for the insurance-policy RAG service

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the RAG system
///
/// `Configuration` and `RetrievalUnavailable` are deliberately separate:
/// a dimension mismatch is a deployment bug and must abort the request,
/// while an unreachable store is a service-health condition the caller may
/// retry. Neither is ever collapsed into an empty result.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("vector store error: {0}")]
    VectorStore(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("chat model error: {0}")]
    ChatModel(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
