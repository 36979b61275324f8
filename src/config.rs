//! Configuration for quote anchoring

use serde::Deserialize;
use std::env;

/// Number of characters of context captured on each side of a quote
pub const CONTEXT_LENGTH: usize = 32;

/// Tuning for text quote capture and re-anchoring
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnchorConfig {
    /// Characters of prefix/suffix captured around a quote
    pub context_length: usize,
    /// Shortest quote that may be searched for without prefix and suffix
    pub min_context_free_quote: usize,
    /// Minimum similarity (0.0-1.0) for the quoted text
    pub pattern_match_threshold: f64,
    /// Minimum similarity (0.0-1.0) for prefix/suffix
    pub context_match_threshold: f64,
    /// Search distance as a multiple of the corpus length
    pub distance_factor: usize,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            context_length: CONTEXT_LENGTH,
            min_context_free_quote: CONTEXT_LENGTH,
            pattern_match_threshold: 0.5,
            context_match_threshold: 0.5,
            distance_factor: 2,
        }
    }
}

impl AnchorConfig {
    /// Build a config from `ANCHOR_*` environment variables.
    ///
    /// Unset variables keep their defaults; unparsable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            context_length: env_or("ANCHOR_CONTEXT_LENGTH", defaults.context_length),
            min_context_free_quote: env_or(
                "ANCHOR_MIN_CONTEXT_FREE_QUOTE",
                defaults.min_context_free_quote,
            ),
            pattern_match_threshold: env_or(
                "ANCHOR_PATTERN_THRESHOLD",
                defaults.pattern_match_threshold,
            ),
            context_match_threshold: env_or(
                "ANCHOR_CONTEXT_THRESHOLD",
                defaults.context_match_threshold,
            ),
            distance_factor: env_or("ANCHOR_DISTANCE_FACTOR", defaults.distance_factor),
        }
    }
}

fn env_or<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
