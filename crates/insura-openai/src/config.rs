//! OpenAI client configuration

use std::env;

use insura_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Whether to apply "query: "/"passage: " prefixes before embedding.
///
/// e5/bge family models were trained with these asymmetric prefixes;
/// embedding a query without its prefix silently degrades similarity
/// quality, so the policy is part of configuration rather than guesswork at
/// call time. `Auto` detects the family from the model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixPolicy {
    Auto,
    Always,
    Never,
}

/// Model families known to want (or not want) the prefix convention.
const PREFIX_FAMILIES_TRUE: &[&str] = &["e5", "bge"];
const PREFIX_FAMILIES_FALSE: &[&str] = &["mpnet", "minilm", "distiluse", "gte"];

/// Configuration for the OpenAI-compatible client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub api_url: String,
    pub embed_model: String,
    pub embed_dim: usize,
    pub chat_model: String,
    pub prefix_policy: PrefixPolicy,
}

impl OpenAIConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            Error::Configuration("OPENAI_API_KEY environment variable not found".to_string())
        })?;

        let api_url =
            env::var("OPENAI_API_URL").unwrap_or_else(|_| "https://api.openai.com".to_string());
        let embed_model =
            env::var("EMBED_MODEL").unwrap_or_else(|_| "text-embedding-3-large".to_string());
        let chat_model = env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let embed_dim = match env::var("EMBED_DIM") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| {
                Error::Configuration(format!("EMBED_DIM must be a positive integer, got '{raw}'"))
            })?,
            Err(_) => 3072,
        };

        let prefix_policy = match env::var("EMBED_USE_PREFIX").ok().as_deref() {
            Some("1") | Some("true") | Some("yes") => PrefixPolicy::Always,
            Some("0") | Some("false") | Some("no") => PrefixPolicy::Never,
            _ => PrefixPolicy::Auto,
        };

        Ok(Self { api_key, api_url, embed_model, embed_dim, chat_model, prefix_policy })
    }

    /// Create configuration with explicit values and defaults elsewhere
    pub fn new(api_key: String, embed_model: String, embed_dim: usize) -> Self {
        Self {
            api_key,
            api_url: "https://api.openai.com".to_string(),
            embed_model,
            embed_dim,
            chat_model: "gpt-4o-mini".to_string(),
            prefix_policy: PrefixPolicy::Auto,
        }
    }

    /// Resolve the prefix policy against the configured embedding model.
    pub fn use_prefix(&self) -> bool {
        match self.prefix_policy {
            PrefixPolicy::Always => true,
            PrefixPolicy::Never => false,
            PrefixPolicy::Auto => {
                let name = self.embed_model.to_lowercase();
                if PREFIX_FAMILIES_TRUE.iter().any(|f| name.contains(f)) {
                    return true;
                }
                if PREFIX_FAMILIES_FALSE.iter().any(|f| name.contains(f)) {
                    return false;
                }
                false
            }
        }
    }
}
