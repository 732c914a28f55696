use anyhow::Result;
use axum::Router;
use clap::Parser;
use relevance_core::SearchConfig;
use relevance_server::build_app;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Path of the sled database holding the index
    #[arg(long, default_value = "./index.sled")]
    db: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 5330)]
    port: u16,
    /// Results returned per query unless the request asks otherwise
    #[arg(long, default_value_t = relevance_core::config::DEFAULT_TOP_K)]
    top_k: usize,
    /// Per-query budget for store lookups, in milliseconds
    #[arg(long, default_value_t = 5000)]
    store_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = SearchConfig {
        top_k: args.top_k,
        store_timeout: Duration::from_millis(args.store_timeout_ms),
        ..SearchConfig::default()
    };
    let app: Router = build_app(&args.db, config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, top_k = config.top_k, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
