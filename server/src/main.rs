use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use rankscope_client::{ItunesClient, ItunesConfig, LlmKeywordSource, SuggestConfig};
use rankscope_core::{Engine, EngineConfig};
use rankscope_server::build_app;

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Marketplace API base URL
    #[arg(long, default_value = "https://itunes.apple.com")]
    api_base: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let client = Arc::new(
        ItunesClient::new(ItunesConfig { base_url: args.api_base.clone(), ..ItunesConfig::default() })
            .context("building marketplace client")?,
    );
    let mut engine = Engine::new(client.clone(), client.clone(), client, EngineConfig::from_env());
    if let Some(cfg) = SuggestConfig::from_env() {
        engine = engine.with_keyword_source(Arc::new(LlmKeywordSource::new(cfg)?));
    }
    let cfg = engine.config();
    tracing::info!(interval_ms = cfg.interval_ms, bulk_delay_ms = cfg.bulk_delay_ms, search_depth = cfg.search_depth, "engine configured");
    let app: Router = build_app(Arc::new(engine));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
