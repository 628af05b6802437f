//! OpenAI-compatible HTTP client implementation

use std::time::Duration;

use async_trait::async_trait;
use insura_core::{ChatModel, ChatOptions, Embedder, Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OpenAIConfig;

const QUERY_PREFIX: &str = "query: ";
const PASSAGE_PREFIX: &str = "passage: ";

/// Client for OpenAI-compatible embedding and chat-completion endpoints
pub struct OpenAIClient {
    config: OpenAIConfig,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAIClient {
    /// Create a new client from configuration
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OpenAIConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Apply the query/passage prefix convention when the model family
    /// requires it, avoiding double-prefixing already-prefixed text.
    pub(crate) fn prepare_text(&self, text: &str, is_query: bool) -> String {
        let cleaned = text.trim();
        if !self.config.use_prefix() {
            return cleaned.to_string();
        }
        let prefix = if is_query { QUERY_PREFIX } else { PASSAGE_PREFIX };
        if cleaned.to_lowercase().starts_with(prefix) {
            cleaned.to_string()
        } else {
            format!("{prefix}{cleaned}")
        }
    }
}

#[async_trait]
impl Embedder for OpenAIClient {
    async fn embed(&self, text: &str, is_query: bool) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: self.config.embed_model.clone(),
            input: vec![self.prepare_text(text, is_query)],
        };

        let url = format!("{}/v1/embeddings", self.config.api_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!("embedding request failed ({status}): {body}")));
        }

        let parsed: EmbeddingResponse =
            response.json().await.map_err(|e| Error::Serialization(e.to_string()))?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("embedding response contained no data".to_string()))?;

        if vector.len() != self.config.embed_dim {
            // A wrong EMBED_DIM is a deployment bug; surfacing it here keeps
            // mismatched vectors out of the store and the scan entirely.
            return Err(Error::Configuration(format!(
                "model '{}' returned dimension {}, configured EMBED_DIM is {}",
                self.config.embed_model,
                vector.len(),
                self.config.embed_dim
            )));
        }

        debug!(model = %self.config.embed_model, is_query, "embedded text");
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.config.embed_dim
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    async fn complete(&self, system: &str, user: &str, options: &ChatOptions) -> Result<String> {
        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system.to_string() },
                ChatMessage { role: "user".to_string(), content: user.to_string() },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.api_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ChatModel(format!("chat request failed ({status}): {body}")));
        }

        let parsed: ChatResponse =
            response.json().await.map_err(|e| Error::Serialization(e.to_string()))?;
        let answer = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::ChatModel("chat response contained no choices".to_string()))?;

        Ok(answer.trim().to_string())
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}
