mod analysis;
mod config;
mod documents;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod streaming;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::embedding::{HashedSkillEmbedder, SkillEmbedder};
use crate::analysis::pipeline::AnalysisEngine;
use crate::analysis::rewrite::{LlmResumeAdvisor, ResumeAdvisor, TemplateResumeAdvisor};
use crate::analysis::vocabulary::SkillVocabulary;
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skill Gap API v{}", env!("CARGO_PKG_VERSION"));

    // Skill vocabulary: built-in table, optionally extended from a JSON file
    let vocabulary = Arc::new(match &config.skill_vocabulary_path {
        Some(path) => SkillVocabulary::with_extension_file(path)?,
        None => SkillVocabulary::builtin()?,
    });
    info!(
        "Skill vocabulary loaded: {} skills (version {})",
        vocabulary.len(),
        vocabulary.version()
    );

    let embedder: Arc<dyn SkillEmbedder> = Arc::new(HashedSkillEmbedder::new(vocabulary.clone()));
    info!("Similarity model: {}", embedder.model_version());

    // Résumé advisor (template by default; LLM when ANTHROPIC_API_KEY is set)
    let advisor: Arc<dyn ResumeAdvisor> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone())
                .map_err(|e| AppError::Llm(format!("LLM client setup failed: {e}")))?;
            info!("Rewrite suggestions via LLM (model: {})", llm_client::MODEL);
            Arc::new(LlmResumeAdvisor(client))
        }
        None => {
            info!("ANTHROPIC_API_KEY not set; rewrite suggestions use the built-in template");
            Arc::new(TemplateResumeAdvisor)
        }
    };

    let engine = AnalysisEngine::new(vocabulary, embedder, advisor, config.analysis.clone());

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine: Arc::new(engine),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the frontend origin before public deployment

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
