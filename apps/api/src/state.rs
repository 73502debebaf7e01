use std::sync::Arc;

use crate::analysis::pipeline::AnalysisEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Vocabulary, embedder and résumé advisor. Built once in `main`, never mutated.
    pub engine: Arc<AnalysisEngine>,
}
