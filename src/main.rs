//! Entry point for the Pricing Engine binary.
//!
//! Running this binary starts an HTTP server exposing the pricing
//! engine.  Plan catalogs are read from the directory named by
//! `PRICING_PLAN_DIR` (default `plans`), the bind address comes from
//! `PRICING_BIND_ADDR`, and `PRICING_RATE_FILE` may point at a JSON
//! file replacing the default rate tables.  Log output is filtered by
//! `RUST_LOG`.

use pricing_engine::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Pricing Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env();
    if let Err(err) = pricing_engine::api::serve(config).await {
        tracing::error!("Error running server: {:#}", err);
        std::process::exit(1);
    }
}
