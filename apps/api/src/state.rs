use std::sync::Arc;

use crate::config::Config;
use crate::matching::MatchScorer;
use crate::nlp::ModelHandle;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup and read-only afterwards. An unavailable model
    /// disables analysis until restart.
    pub model: ModelHandle,
    /// Pluggable match scorer. Default: SubstringMatchScorer.
    pub match_scorer: Arc<dyn MatchScorer>,
    pub config: Config,
}
