use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pr_latency::config::AppConfig;
use pr_latency::{ingest, AppContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pr_latency=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    let ctx = AppContext::new(config)
        .await
        .context("failed to initialize the ingestion context")?;

    tracing::info!(
        repo = %ctx.repo,
        window_start = %ctx.window.start.format("%Y-%m-%d"),
        window_end = %ctx.window.end.format("%Y-%m-%d"),
        "starting ingestion"
    );

    let stats = ingest::run(&ctx).await.context("ingestion failed")?;

    tracing::info!(
        pages = stats.pages,
        emitted = stats.emitted,
        "ingestion complete"
    );

    Ok(())
}
