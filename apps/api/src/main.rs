mod backend;
mod bidding;
mod config;
mod errors;
mod llm_client;
mod marketplace;
mod models;
mod profile;
mod routes;
mod search;
mod session;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::backend::{HttpBackend, HttpBidProxy};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::marketplace::HttpMarketplace;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::WorkflowStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting autobid v{}", env!("CARGO_PKG_VERSION"));

    let marketplace = HttpMarketplace::new(
        config.marketplace_graphql_url.clone(),
        config.request_timeout,
    )?;
    info!("Marketplace client initialized ({})", config.marketplace_graphql_url);

    let backend = HttpBackend::from_config(&config)?;
    let proxy = HttpBidProxy::new(config.bid_proxy_url.clone(), config.request_timeout)?;
    info!("Account backend at {}", config.backend_base_url);

    let llm = LlmClient::new(
        config.openai_api_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.request_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        config: config.clone(),
        marketplace: Arc::new(marketplace),
        backend: Arc::new(backend),
        proxy: Arc::new(proxy),
        generator: Arc::new(llm),
        store: Arc::new(WorkflowStore::default()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
