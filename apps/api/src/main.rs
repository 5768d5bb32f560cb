mod config;
mod dashboard;
mod errors;
mod extraction;
mod matching;
mod nlp;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::matching::{MatchScorer, SubstringMatchScorer};
use crate::nlp::ModelHandle;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Load the entity model once; a failure leaves analysis disabled until restart.
    let model_path = config.model_path.clone();
    let model = tokio::task::spawn_blocking(move || ModelHandle::load(&model_path)).await?;
    if !model.is_loaded() {
        warn!("Analysis disabled: no entity model at {}", config.model_path.display());
    }

    let match_scorer: Arc<dyn MatchScorer> = Arc::new(SubstringMatchScorer);
    info!("Match scorer: {}", match_scorer.backend());

    let state = AppState {
        model,
        match_scorer,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
