mod configuration;
mod routes;
mod state;

use anyhow::{Context, Result};
use scout::search::DuckDuckGoSearch;
use scout::tools::ToolDispatcher;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = configuration::Settings::new().context("Failed to load configuration")?;
    let addr = settings.server.socket_addr()?;

    let search = DuckDuckGoSearch::new(settings.search.into_config())
        .context("Failed to build the search client")?;
    let state = state::AppState {
        dispatcher: ToolDispatcher::new(Arc::new(search)),
    };

    let app = routes::configure(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
