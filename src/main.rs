use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use insura_openai::OpenAIClient;
use insura_rag::engine::{RetrievalConfig, RetrievalEngine};
use insura_rag::{Embedder, QdrantVectorStore};
use insura_server::{AnswerService, AppState, serve};

#[derive(Parser)]
#[command(name = "insura")]
#[command(about = "Insurance-policy RAG question-answering service", long_about = None)]
struct Cli {
    /// Address to bind the HTTP server on
    #[arg(long, default_value = "0.0.0.0:8000")]
    addr: SocketAddr,

    /// Qdrant endpoint
    #[arg(long, default_value = "http://localhost:6334")]
    qdrant_url: String,

    /// Qdrant collection holding the embedded policy chunks
    #[arg(long, default_value = "document_chunks")]
    collection: String,

    /// Disable the domain-synonym query expansion
    #[arg(long)]
    no_query_expansion: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    // One client serves both roles: query embedder and answer model.
    let openai = Arc::new(OpenAIClient::from_env()?);
    let store = Arc::new(QdrantVectorStore::new(
        &cli.qdrant_url,
        cli.collection.clone(),
        openai.dimension(),
    )?);

    let config = RetrievalConfig {
        expand_query: !cli.no_query_expansion,
        ..RetrievalConfig::default()
    };
    let engine = RetrievalEngine::new(store.clone(), openai.clone(), config);
    let service = AnswerService::new(engine, openai.clone());

    let state = Arc::new(AppState { service, store });
    serve(cli.addr, state).await
}
