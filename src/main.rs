mod backend;
mod chain;
mod config;
mod errors;
mod index;
mod logging;
mod server;
mod session;
mod state;

use std::path::Path;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Same startup order as the environment expects: .env first, then
    // fail fast on anything required that is still missing.
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env().context("configuration error")?;

    logging::init(Path::new("./logs"));
    tracing::info!(
        "starting helpbot: generation={} embedding={} max_history={}",
        config.generation_model,
        config.embedding_model,
        config.max_history_length
    );

    let bind_addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let state = AppState::new(config);
    let app = server::router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
