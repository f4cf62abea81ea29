//! AI Tool Rank binary entrypoint.
//! Boots the Axum HTTP server: config, tracing, metrics, shared state and routes.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use ai_tool_rank::{api, config::AppConfig, metrics::Metrics};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    ai_tool_rank::init_tracing();

    let config = AppConfig::load_default().context("loading app config")?;
    tracing::info!(
        feed = config.feed_url.is_some(),
        cache_ttl_secs = config.cache_ttl_secs,
        revalidate_enabled = config.revalidate_token.is_some(),
        "starting ai-tool-rank"
    );

    let metrics = Metrics::init(config.cache_ttl_secs)?;
    let state = api::AppState::from_config(config).context("building app state")?;
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
