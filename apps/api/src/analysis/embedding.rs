//! Skill embeddings — the distance function behind semantic matching.
//!
//! Default: `HashedSkillEmbedder` (pure-Rust, deterministic, no model download).
//! Each vector is the vocabulary family one-hot (weight √0.7) concatenated with
//! a hashed character-trigram profile of the skill key (weight √0.3, or full
//! weight when the skill has no family). Substitutes in one family land near
//! 0.7 cosine, unrelated skills stay well below the weak band.
//!
//! `AnalysisEngine` holds an `Arc<dyn SkillEmbedder>`, so a model-backed
//! embedder can replace it without touching the matcher.

use std::sync::Arc;

use async_trait::async_trait;

use crate::analysis::vocabulary::SkillVocabulary;
use crate::errors::AppError;
use crate::models::analysis::SkillKey;

const TRIGRAM_DIMS: usize = 256;
const FAMILY_WEIGHT: f32 = 0.7;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait SkillEmbedder: Send + Sync {
    /// One vector per key, in input order. All vectors share a dimension.
    async fn embed_batch(&self, skills: &[SkillKey]) -> Result<Vec<Vec<f32>>, AppError>;

    /// Identifies the model, reported by `/health`.
    fn model_version(&self) -> String;
}

// ────────────────────────────────────────────────────────────────────────────
// HashedSkillEmbedder — default implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct HashedSkillEmbedder {
    vocabulary: Arc<SkillVocabulary>,
}

impl HashedSkillEmbedder {
    pub fn new(vocabulary: Arc<SkillVocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn dimensions(&self) -> usize {
        self.vocabulary.family_count() + TRIGRAM_DIMS
    }

    fn embed_one(&self, key: &SkillKey) -> Vec<f32> {
        let families = self.vocabulary.family_count();
        let mut vector = vec![0.0f32; self.dimensions()];

        let trigrams = trigram_profile(key.as_str());
        let trigram_weight = match self.vocabulary.family_index(key) {
            Some(family) => {
                vector[family] = FAMILY_WEIGHT.sqrt();
                (1.0 - FAMILY_WEIGHT).sqrt()
            }
            None => 1.0,
        };
        for (slot, value) in vector[families..].iter_mut().zip(trigrams) {
            *slot = value * trigram_weight;
        }

        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl SkillEmbedder for HashedSkillEmbedder {
    async fn embed_batch(&self, skills: &[SkillKey]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(skills.iter().map(|key| self.embed_one(key)).collect())
    }

    fn model_version(&self) -> String {
        format!("hashed-trigram-v1+vocab-{}", self.vocabulary.version())
    }
}

/// Unit-length bag of hashed character trigrams over `^key$`.
fn trigram_profile(key: &str) -> Vec<f32> {
    let padded: Vec<char> = std::iter::once('^')
        .chain(key.chars())
        .chain(std::iter::once('$'))
        .collect();

    let mut profile = vec![0.0f32; TRIGRAM_DIMS];
    for window in padded.windows(3) {
        let trigram: String = window.iter().collect();
        let bucket = (fnv1a(trigram.as_bytes()) % TRIGRAM_DIMS as u64) as usize;
        profile[bucket] += 1.0;
    }
    normalize(&mut profile);
    profile
}

/// 64-bit FNV-1a. Stable across runs and platforms, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Cosine similarity; 0.0 when either vector is all zeros.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder() -> HashedSkillEmbedder {
        HashedSkillEmbedder::new(Arc::new(SkillVocabulary::builtin().unwrap()))
    }

    async fn similarity(a: &str, b: &str) -> f32 {
        let embedder = embedder();
        let vectors = embedder
            .embed_batch(&[SkillKey::new(a), SkillKey::new(b)])
            .await
            .unwrap();
        cosine(&vectors[0], &vectors[1])
    }

    #[tokio::test]
    async fn test_family_substitutes_land_in_weak_band() {
        let sim = similarity("React", "Vue").await;
        assert!((0.65..0.8).contains(&sim), "react/vue similarity {sim}");

        let sim = similarity("PostgreSQL", "MySQL").await;
        assert!((0.65..0.85).contains(&sim), "postgres/mysql similarity {sim}");
    }

    #[tokio::test]
    async fn test_unrelated_skills_are_far_apart() {
        assert!(similarity("Docker", "Kubernetes").await < 0.3);
        assert!(similarity("React", "PostgreSQL").await < 0.3);
    }

    #[tokio::test]
    async fn test_identical_keys_are_identical_vectors() {
        let sim = similarity("Kubernetes", "kubernetes").await;
        assert!((sim - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_vectors_are_unit_length_and_stable() {
        let embedder = embedder();
        let keys = [SkillKey::new("LangChain"), SkillKey::new("AWS")];
        let first = embedder.embed_batch(&keys).await.unwrap();
        let second = embedder.embed_batch(&keys).await.unwrap();
        assert_eq!(first, second);
        for vector in &first {
            assert_eq!(vector.len(), embedder.dimensions());
            let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cosine_handles_zero_vectors() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_model_version_names_vocabulary() {
        assert!(embedder().model_version().ends_with(crate::analysis::vocabulary::BUILTIN_VERSION));
    }
}
