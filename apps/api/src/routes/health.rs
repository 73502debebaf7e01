use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus the vocabulary and similarity model every analysis runs against.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "vocabulary_version": state.engine.vocabulary().version(),
        "embedding_model": state.engine.embedder().model_version(),
    }))
}
