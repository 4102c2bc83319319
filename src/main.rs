//! Jotter auth gateway - the HTTP server in front of the identity provider.
//!
//! Configuration comes from the environment (a `.env` file is honoured):
//!
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: identity provider endpoint and key
//! - `JOTTER_ADDR`: listen address (default `0.0.0.0:5000`)
//! - `PROVIDER_TIMEOUT_SECS`: per-request provider timeout (default 10)

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jotter::{router, AppState, Config, SupabaseProvider};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jotter=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let provider = SupabaseProvider::new(
        config.provider_url.clone(),
        config.provider_key.clone(),
        config.provider_timeout,
    )?;
    let state = Arc::new(AppState::new(Arc::new(provider)));

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    tracing::info!("Server is running on {}", config.addr);
    tracing::info!("Identity provider: {}", config.provider_url);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
