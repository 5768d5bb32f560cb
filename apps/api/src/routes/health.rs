use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::nlp::ModelHandle;
use crate::state::AppState;

/// GET /health
/// Returns service version plus the state of the entity model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let model = match &state.model {
        ModelHandle::Loaded(recognizer) => json!({
            "loaded": true,
            "name": recognizer.name(),
            "labels": recognizer.labels(),
        }),
        ModelHandle::Unavailable { reason } => json!({
            "loaded": false,
            "reason": reason,
        }),
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyzer",
        "model": model,
        "match_scorer": state.match_scorer.backend(),
    }))
}
