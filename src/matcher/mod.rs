//! Approximate text matching port
//!
//! Quote anchors re-find text that moved or changed through an
//! [`ApproximateMatcher`]. Any fuzzy search (bitap, edit distance, n-gram
//! index, ...) can sit behind the trait as long as it returns ranked
//! `{start, end}` candidates as `char` offsets into the corpus. Quote anchors
//! convert them to code units.
//! [`FuzzyMatcher`] is the bundled edit-distance implementation.

mod fuzzy;

pub use fuzzy::FuzzyMatcher;

use serde::{Deserialize, Serialize};

use crate::config::AnchorConfig;

/// Matching tolerances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    /// How far from the hint a pattern match may lie
    pub match_distance: usize,
    /// How far from the pattern match its context may lie
    pub context_match_distance: usize,
    /// Minimum prefix/suffix similarity (0.0-1.0)
    pub context_match_threshold: f64,
    /// Minimum pattern similarity (0.0-1.0)
    pub pattern_match_threshold: f64,
    /// Align context approximately instead of at a fixed width
    pub flex_context: bool,
    /// Compare characters ignoring case, diacritics and whitespace kind
    pub with_fuzzy_comparison: bool,
}

impl MatchOptions {
    /// Default options for a corpus of `len` characters
    pub fn for_corpus(len: usize) -> Self {
        Self::from_config(len, &AnchorConfig::default())
    }

    /// Options for a corpus of `len` characters using configured tolerances
    pub fn from_config(len: usize, config: &AnchorConfig) -> Self {
        let distance = len.saturating_mul(config.distance_factor);
        Self {
            match_distance: distance,
            context_match_distance: distance,
            context_match_threshold: config.context_match_threshold,
            pattern_match_threshold: config.pattern_match_threshold,
            flex_context: true,
            with_fuzzy_comparison: true,
        }
    }
}

/// Search for a pattern surrounded by context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextQuery<'q> {
    pub prefix: &'q str,
    pub suffix: &'q str,
    pub pattern: &'q str,
    /// Expected start of the pattern
    pub hint_start: Option<usize>,
    /// Expected end of the pattern
    pub hint_end: Option<usize>,
    /// Prefer candidates near the hint
    pub bias_to_hint: bool,
}

/// Search for a pattern alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternQuery<'q> {
    pub pattern: &'q str,
    /// Expected start of the pattern
    pub hint_start: Option<usize>,
    /// Prefer candidates near the hint
    pub bias_to_hint: bool,
}

/// A candidate location of the pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMatch {
    /// Start character offset in the corpus
    pub start: usize,
    /// End character offset in the corpus (exclusive)
    pub end: usize,
    /// Ranking score, higher is better
    pub score: f64,
}

/// Candidates ranked best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResults {
    pub matches: Vec<TextMatch>,
}

impl MatchResults {
    pub fn best(&self) -> Option<&TextMatch> {
        self.matches.first()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Approximate string search over a corpus
pub trait ApproximateMatcher {
    /// Find `query.pattern` where it is surrounded by `query.prefix` and
    /// `query.suffix`
    fn search_fuzzy_with_context(
        &self,
        corpus: &str,
        query: &ContextQuery<'_>,
        options: &MatchOptions,
    ) -> MatchResults;

    /// Find `query.pattern` on its own
    fn search_fuzzy(
        &self,
        corpus: &str,
        query: &PatternQuery<'_>,
        options: &MatchOptions,
    ) -> MatchResults;
}

impl<M: ApproximateMatcher + ?Sized> ApproximateMatcher for &M {
    fn search_fuzzy_with_context(
        &self,
        corpus: &str,
        query: &ContextQuery<'_>,
        options: &MatchOptions,
    ) -> MatchResults {
        (**self).search_fuzzy_with_context(corpus, query, options)
    }

    fn search_fuzzy(
        &self,
        corpus: &str,
        query: &PatternQuery<'_>,
        options: &MatchOptions,
    ) -> MatchResults {
        (**self).search_fuzzy(corpus, query, options)
    }
}
