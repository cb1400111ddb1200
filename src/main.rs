use anyhow::Context;
use blastari_core::{AppConfig, DEFAULT_CONFIG_PATH};
use blastari_server::{router, AppState, EmailNotifier, HttpPageFetcher};
use database::Database;
use llm_interface::OpenAiProvider;
use reddit_client::RedditClient;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blastari=debug,blastari_server=debug,info")),
        )
        .init();

    tracing::info!("Starting BLASTari");

    let config_path = std::env::var("BLASTARI_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    config.validate().context("invalid configuration")?;
    let timeout = config.request_timeout();

    let db = Database::connect(&config.database_url)
        .await
        .context("connecting to the database")?;
    db.run_migrations().await.context("running migrations")?;

    let llm = OpenAiProvider::from_config(&config.openai, timeout)?;
    let reddit = RedditClient::from_config(&config.reddit, timeout)?;
    let reddit_metrics = reddit.metrics_collector();
    let fetcher = HttpPageFetcher::new(timeout)?;

    let mut state = AppState::new(db, Arc::new(llm), Arc::new(reddit), Arc::new(fetcher))
        .with_reddit_metrics(reddit_metrics);
    match EmailNotifier::from_config(&config.email, timeout)? {
        Some(notifier) => state = state.with_notifier(Arc::new(notifier)),
        None => tracing::warn!("Email is not configured; feedback will only be stored"),
    }

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("BLASTari stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
