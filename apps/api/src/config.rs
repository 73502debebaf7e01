use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Size ceilings and word-count minimums applied before any stage runs.
#[derive(Debug, Clone)]
pub struct InputLimits {
    pub resume_min_words: usize,
    pub job_min_words: usize,
    pub max_text_chars: usize,
    pub max_upload_bytes: usize,
}

/// Headroom for multipart boundaries and part headers.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// WordprocessingML markup bytes allowed per character of extracted text.
const MARKUP_BYTES_PER_CHAR: usize = 40;

impl InputLimits {
    /// Largest request body worth reading: one upload plus two texts at four
    /// UTF-8 bytes per character.
    pub fn max_request_bytes(&self) -> usize {
        self.max_upload_bytes + 2 * 4 * self.max_text_chars + FORM_OVERHEAD_BYTES
    }

    /// Total bytes an uploaded archive (DOCX) may inflate to: room for the
    /// stored media plus markup around the longest accepted text.
    pub fn max_unpacked_bytes(&self) -> usize {
        2 * self.max_upload_bytes + MARKUP_BYTES_PER_CHAR * self.max_text_chars
    }
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            resume_min_words: 50,
            job_min_words: 30,
            max_text_chars: 50_000,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Cosine-similarity bands used by the matcher.
#[derive(Debug, Clone, Copy)]
pub struct MatchThresholds {
    /// At or above: matched.
    pub matched: f32,
    /// At or above (and below `matched`): weak.
    pub weak: f32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            matched: 0.85,
            weak: 0.60,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisSettings {
    pub limits: InputLimits,
    pub thresholds: MatchThresholds,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Enables LLM résumé rewrite suggestions. Template fallback when unset.
    pub anthropic_api_key: Option<String>,
    pub skill_vocabulary_path: Option<PathBuf>,
    pub analysis: AnalysisSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = AnalysisSettings::default();
        let analysis = AnalysisSettings {
            limits: InputLimits {
                resume_min_words: env_or("RESUME_MIN_WORDS", defaults.limits.resume_min_words)?,
                job_min_words: env_or("JOB_MIN_WORDS", defaults.limits.job_min_words)?,
                max_text_chars: env_or("MAX_TEXT_CHARS", defaults.limits.max_text_chars)?,
                max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.limits.max_upload_bytes)?,
            },
            thresholds: MatchThresholds {
                matched: env_or("MATCH_THRESHOLD", defaults.thresholds.matched)?,
                weak: env_or("WEAK_THRESHOLD", defaults.thresholds.weak)?,
            },
        };
        validate_thresholds(&analysis.thresholds)?;

        Ok(Config {
            port: env_or("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            skill_vocabulary_path: optional_env("SKILL_VOCABULARY_PATH").map(PathBuf::from),
            analysis,
        })
    }
}

fn validate_thresholds(thresholds: &MatchThresholds) -> Result<()> {
    let MatchThresholds { matched, weak } = *thresholds;
    if !(0.0 < weak && weak < matched && matched <= 1.0) {
        bail!("Thresholds must satisfy 0 < WEAK_THRESHOLD ({weak}) < MATCH_THRESHOLD ({matched}) <= 1");
    }
    Ok(())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_match_policy() {
        let limits = InputLimits::default();
        assert_eq!(limits.resume_min_words, 50);
        assert_eq!(limits.job_min_words, 30);
    }

    #[test]
    fn test_unpacked_budget_scales_with_limits() {
        let limits = InputLimits {
            max_text_chars: 1_000,
            max_upload_bytes: 10_000,
            ..InputLimits::default()
        };
        assert_eq!(limits.max_unpacked_bytes(), 20_000 + 40_000);
        assert!(InputLimits::default().max_unpacked_bytes() > InputLimits::default().max_upload_bytes);
    }

    #[test]
    fn test_default_thresholds_are_valid() {
        assert!(validate_thresholds(&MatchThresholds::default()).is_ok());
    }

    #[test]
    fn test_inverted_thresholds_are_rejected() {
        let thresholds = MatchThresholds {
            matched: 0.5,
            weak: 0.7,
        };
        assert!(validate_thresholds(&thresholds).is_err());
    }

    #[test]
    fn test_env_or_parses_and_defaults() {
        std::env::set_var("SKILL_GAP_TEST_WORDS", " 12 ");
        assert_eq!(env_or("SKILL_GAP_TEST_WORDS", 50usize).unwrap(), 12);
        assert_eq!(env_or("SKILL_GAP_TEST_UNSET", 50usize).unwrap(), 50);

        std::env::set_var("SKILL_GAP_TEST_BAD", "many");
        assert!(env_or("SKILL_GAP_TEST_BAD", 50usize).is_err());
    }
}
