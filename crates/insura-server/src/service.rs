//! Answer orchestration: question → retrieval → grounded LLM answer
//!
//! Deliberately thin. The one piece of policy here is the no-context path:
//! an empty retrieval is a legitimate outcome that becomes a typed
//! `NoContext` result (HTTP 404 upstream), never an ungrounded answer and
//! never an error masquerading as one.

use std::sync::Arc;

use insura_core::{ChatModel, ChatOptions, Embedder, Result, ScoredChunk, VectorStore};
use insura_rag::context;
use insura_rag::engine::RetrievalEngine;
use tracing::info;

/// A grounded answer with its citations.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
    pub model: String,
}

/// Outcome of an ask: either a grounded answer or an explicit no-context
/// signal the caller must surface to the user.
#[derive(Debug, Clone)]
pub enum AnswerOutcome {
    Answered(Answer),
    NoContext,
}

pub struct AnswerService<S: VectorStore, E: Embedder> {
    engine: RetrievalEngine<S, E>,
    chat: Arc<dyn ChatModel>,
}

impl<S: VectorStore, E: Embedder> AnswerService<S, E> {
    pub fn new(engine: RetrievalEngine<S, E>, chat: Arc<dyn ChatModel>) -> Self {
        Self { engine, chat }
    }

    pub fn engine(&self) -> &RetrievalEngine<S, E> {
        &self.engine
    }

    /// End-to-end flow: retrieve grounding chunks, build the prompt, call
    /// the chat model. Retrieval errors propagate unmodified so the HTTP
    /// layer can distinguish a broken store from missing content.
    pub async fn ask(
        &self,
        question: &str,
        policy_type: Option<&str>,
        top_k: usize,
        max_tokens: u32,
    ) -> Result<AnswerOutcome> {
        let sources = self.engine.retrieve(question, policy_type, top_k).await?;
        if sources.is_empty() {
            info!(policy_type, "no grounding context found");
            return Ok(AnswerOutcome::NoContext);
        }

        let prompt = context::build_prompt(question, &sources);
        let options = ChatOptions { max_tokens, ..ChatOptions::default() };
        let answer = self.chat.complete(context::SYSTEM_PROMPT, &prompt, &options).await?;

        Ok(AnswerOutcome::Answered(Answer {
            answer,
            sources,
            model: self.chat.model_id().to_string(),
        }))
    }

    /// Retrieval only, for the document-search endpoint.
    pub async fn search(
        &self,
        question: &str,
        policy_type: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        self.engine.retrieve(question, policy_type, top_k).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use insura_core::{DocumentChunk, Error};
    use insura_rag::engine::RetrievalConfig;
    use insura_rag::{HashEmbedder, LocalVectorStore};

    use super::*;

    struct EchoChat;

    #[async_trait]
    impl ChatModel for EchoChat {
        async fn complete(
            &self,
            _system: &str,
            user: &str,
            _options: &ChatOptions,
        ) -> Result<String> {
            Ok(format!("echo: {} chars", user.len()))
        }

        fn model_id(&self) -> &str {
            "echo-test"
        }
    }

    async fn service_with_chunks(
        texts: &[&str],
    ) -> AnswerService<LocalVectorStore, HashEmbedder> {
        let embedder = HashEmbedder::new(16);
        let store = LocalVectorStore::new(16);
        for (i, text) in texts.iter().enumerate() {
            let embedding = embedder.embed(text, false).await.unwrap();
            store
                .insert(
                    DocumentChunk {
                        doc_id: i as i64,
                        chunk_id: format!("c{i}"),
                        content: text.to_string(),
                        category: Some("공통".to_string()),
                        clause_title: None,
                        file_name: Some("g.pdf".to_string()),
                        page: Some(i as u32),
                    },
                    Some(embedding),
                )
                .unwrap();
        }
        let engine = RetrievalEngine::new(
            Arc::new(store),
            Arc::new(embedder),
            RetrievalConfig { expand_query: false, ..RetrievalConfig::default() },
        );
        AnswerService::new(engine, Arc::new(EchoChat))
    }

    #[tokio::test]
    async fn test_ask_returns_grounded_answer() {
        let service = service_with_chunks(&["실손 청구 안내", "자동차 사고 접수"]).await;
        let outcome = service.ask("실손 청구 안내", None, 2, 600).await.unwrap();
        match outcome {
            AnswerOutcome::Answered(answer) => {
                assert!(answer.answer.starts_with("echo:"));
                assert_eq!(answer.model, "echo-test");
                assert!(!answer.sources.is_empty());
            }
            AnswerOutcome::NoContext => panic!("expected a grounded answer"),
        }
    }

    #[tokio::test]
    async fn test_ask_empty_store_is_no_context() {
        let service = service_with_chunks(&[]).await;
        let outcome = service.ask("실손 청구 안내", None, 3, 600).await.unwrap();
        assert!(matches!(outcome, AnswerOutcome::NoContext));
    }

    #[tokio::test]
    async fn test_invalid_question_propagates() {
        let service = service_with_chunks(&["실손 청구 안내"]).await;
        let err = service.ask("[ ]", None, 3, 600).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
