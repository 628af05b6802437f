//! Chat model trait and options

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Options for a single chat completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self { max_tokens: 600, temperature: 0.2 }
    }
}

/// Trait for hosted chat models
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for a system + user message pair.
    async fn complete(&self, system: &str, user: &str, options: &ChatOptions) -> Result<String>;

    /// The model identifier, surfaced to callers alongside answers.
    fn model_id(&self) -> &str;
}
