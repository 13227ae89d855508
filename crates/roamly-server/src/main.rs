//! roamly HTTP server

use anyhow::Result;
use clap::Parser;
use roamly_core::{Catalog, Config, HttpEmbedder, Indexer, OpenAIClient, SuggestEngine};
use roamly_server::routes::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roamly-server", about = "Semantic tour-package search API")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000", env = "ROAMLY_BIND")]
    bind: SocketAddr,

    /// Path to the catalog database
    #[arg(long, default_value = "roamly.db", env = "ROAMLY_DB")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    let catalog = Catalog::open(&args.db)?;
    tracing::info!(
        db = %args.db.display(),
        packages = catalog.count()?,
        "Catalog opened"
    );

    let client = Arc::new(OpenAIClient::new(config.llm.clone())?);
    let embedder = Arc::new(HttpEmbedder::new(client.clone()));
    let engine = SuggestEngine::new(embedder.clone(), client, &config);
    let indexer = Indexer::new(embedder, config.pricing.clone());

    let state = Arc::new(AppState {
        catalog,
        engine,
        indexer,
    });

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!(addr = %args.bind, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
