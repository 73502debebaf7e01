// Skill-gap analysis engine.
// Normalize → extract (résumé and job) → match → score and plan, streamed as progress records.
// The vocabulary and embedder are built once at startup and shared read-only.

pub mod embedding;
pub mod handlers;
pub mod matcher;
pub mod normalizer;
pub mod pipeline;
pub mod planner;
pub mod proficiency;
pub mod prompts;
pub mod rewrite;
pub mod scoring;
pub mod skill_extractor;
pub mod vocabulary;
