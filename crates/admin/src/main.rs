use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wikistore_db::PagesStore;

mod config;
mod report;

use config::AdminConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wikistore_admin=debug,wikistore_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AdminConfig::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "Opening pages store");

    let store = PagesStore::init(&config.connection, &config.data_dir)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "Store initialization failed"))
        .context("Failed to initialize the pages store")?;
    tracing::info!("Pages store ready");

    let report = report::collect(&store)
        .await
        .context("Failed to read the pages store")?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    store.close().await;
    Ok(())
}
