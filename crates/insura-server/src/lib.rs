//! HTTP surface and answer orchestration
//!
//! Thin glue over the retrieval engine: request schemas, the end-to-end
//! question → cited answer flow, and the axum routes. All heavy lifting
//! lives below in `insura-rag`; this crate only marshals requests and maps
//! the error taxonomy onto HTTP statuses.

pub mod routes;
pub mod schemas;
pub mod service;

pub use routes::{AppState, router, serve};
pub use schemas::{AnswerResponse, AskRequest, SearchRequest, SearchResponse, SourceItem};
pub use service::{Answer, AnswerOutcome, AnswerService};
