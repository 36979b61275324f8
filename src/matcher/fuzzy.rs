//! Edit-distance matcher
//!
//! Pattern candidates come from Sellers' approximate substring search: an
//! edit-distance table whose first row is free, so a match may start
//! anywhere in the corpus. Overlapping candidates are collapsed to the best
//! one, then context and proximity to the hint decide the ranking.

use unicode_normalization::char::{decompose_compatible, is_combining_mark};

use super::{
    ApproximateMatcher, ContextQuery, MatchOptions, MatchResults, PatternQuery, TextMatch,
};

/// How much being far from the hint costs, relative to similarity
const PROXIMITY_WEIGHT: f64 = 0.25;

/// Approximate matcher over plain edit distance
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    distance: usize,
}

impl ApproximateMatcher for FuzzyMatcher {
    fn search_fuzzy_with_context(
        &self,
        corpus: &str,
        query: &ContextQuery<'_>,
        options: &MatchOptions,
    ) -> MatchResults {
        let fuzzy = options.with_fuzzy_comparison;
        let text = prepare(corpus, fuzzy);
        let pattern = prepare(query.pattern, fuzzy);
        let prefix = prepare(query.prefix, fuzzy);
        let suffix = prepare(query.suffix, fuzzy);

        let candidates = pattern_candidates(
            &text,
            &pattern,
            query.hint_start.filter(|_| query.bias_to_hint),
            options,
        );
        let context_len = prefix.len() + suffix.len();

        let mut matches: Vec<TextMatch> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let prefix_distance =
                    prefix_distance(&text, &prefix, candidate.start, options);
                let suffix_distance = suffix_distance(&text, &suffix, candidate.end, options);
                let context_similarity =
                    similarity(prefix_distance + suffix_distance, context_len);
                if context_similarity < options.context_match_threshold {
                    tracing::trace!(
                        start = candidate.start,
                        context_similarity,
                        "rejecting candidate on context"
                    );
                    return None;
                }

                let total = pattern.len() + context_len;
                let combined = (similarity(candidate.distance, pattern.len()) * pattern.len() as f64
                    + context_similarity * context_len as f64)
                    / total as f64;
                let proximity = if query.bias_to_hint {
                    proximity(&candidate, query.hint_start, query.hint_end, options)
                } else {
                    0.0
                };

                Some(TextMatch {
                    start: candidate.start,
                    end: candidate.end,
                    score: combined - proximity,
                })
            })
            .collect();

        rank(&mut matches);
        tracing::debug!(
            candidates = matches.len(),
            "context search for {} character pattern",
            pattern.len()
        );
        MatchResults { matches }
    }

    fn search_fuzzy(
        &self,
        corpus: &str,
        query: &PatternQuery<'_>,
        options: &MatchOptions,
    ) -> MatchResults {
        let fuzzy = options.with_fuzzy_comparison;
        let text = prepare(corpus, fuzzy);
        let pattern = prepare(query.pattern, fuzzy);
        let hint = query.hint_start.filter(|_| query.bias_to_hint);

        let mut matches: Vec<TextMatch> = pattern_candidates(&text, &pattern, hint, options)
            .into_iter()
            .map(|candidate| {
                let proximity = if query.bias_to_hint {
                    proximity(&candidate, query.hint_start, None, options)
                } else {
                    0.0
                };
                TextMatch {
                    start: candidate.start,
                    end: candidate.end,
                    score: similarity(candidate.distance, pattern.len()) - proximity,
                }
            })
            .collect();

        rank(&mut matches);
        tracing::debug!(
            candidates = matches.len(),
            "pattern search for {} character pattern",
            pattern.len()
        );
        MatchResults { matches }
    }
}

/// Characters to compare, one per input character so offsets are preserved
fn prepare(text: &str, fuzzy: bool) -> Vec<char> {
    if fuzzy {
        text.chars().map(fold).collect()
    } else {
        text.chars().collect()
    }
}

/// Fold case, diacritics and whitespace kind
fn fold(c: char) -> char {
    if c.is_whitespace() {
        return ' ';
    }
    let mut base = None;
    decompose_compatible(c, |d| {
        if base.is_none() && !is_combining_mark(d) {
            base = Some(d);
        }
    });
    let base = base.unwrap_or(c);
    base.to_lowercase().next().unwrap_or(base)
}

fn similarity(distance: usize, len: usize) -> f64 {
    if len == 0 {
        return 1.0;
    }
    1.0 - (distance.min(len) as f64 / len as f64)
}

fn max_errors(len: usize, threshold: f64) -> usize {
    ((1.0 - threshold.clamp(0.0, 1.0)) * len as f64).floor() as usize
}

fn proximity(
    candidate: &Candidate,
    hint_start: Option<usize>,
    hint_end: Option<usize>,
    options: &MatchOptions,
) -> f64 {
    let distance = options.match_distance.max(1) as f64;
    let offsets = match (hint_start, hint_end) {
        (Some(start), Some(end)) => {
            (candidate.start.abs_diff(start) + candidate.end.abs_diff(end)) as f64 / 2.0
        }
        (Some(start), None) => candidate.start.abs_diff(start) as f64,
        (None, Some(end)) => candidate.end.abs_diff(end) as f64,
        (None, None) => return 0.0,
    };
    PROXIMITY_WEIGHT * (offsets / distance).min(1.0)
}

/// Best candidate of each cluster of overlapping approximate matches
fn pattern_candidates(
    text: &[char],
    pattern: &[char],
    hint: Option<usize>,
    options: &MatchOptions,
) -> Vec<Candidate> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let max_distance = max_errors(pattern.len(), options.pattern_match_threshold);

    let mut clusters: Vec<Candidate> = Vec::new();
    let mut cluster_end = 0;
    for candidate in approximate_ends(text, pattern, max_distance) {
        if let Some(hint) = hint {
            if candidate.start.abs_diff(hint) > options.match_distance {
                continue;
            }
        }
        let overlapping = !clusters.is_empty() && candidate.start < cluster_end;
        if overlapping {
            if let Some(best) = clusters.last_mut() {
                if candidate.distance < best.distance {
                    *best = candidate;
                }
            }
            cluster_end = cluster_end.max(candidate.end);
        } else {
            cluster_end = candidate.end;
            clusters.push(candidate);
        }
    }
    clusters
}

/// Every end position where the pattern matches within `max_distance` edits,
/// with the start of the cheapest alignment ending there
fn approximate_ends(text: &[char], pattern: &[char], max_distance: usize) -> Vec<Candidate> {
    let m = pattern.len();
    // (distance, start) per pattern prefix length
    let mut previous: Vec<(usize, usize)> = (0..=m).map(|i| (i, 0)).collect();
    let mut current = vec![(0, 0); m + 1];
    let mut found = Vec::new();

    for j in 1..=text.len() {
        current[0] = (0, j);
        for i in 1..=m {
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            let mut best = (previous[i - 1].0 + cost, previous[i - 1].1);
            if current[i - 1].0 + 1 < best.0 {
                best = (current[i - 1].0 + 1, current[i - 1].1);
            }
            if previous[i].0 + 1 < best.0 {
                best = (previous[i].0 + 1, previous[i].1);
            }
            current[i] = best;
        }

        let (distance, start) = current[m];
        if distance <= max_distance && start < j {
            found.push(Candidate {
                start,
                end: j,
                distance,
            });
        }
        std::mem::swap(&mut previous, &mut current);
    }
    found
}

/// Edits needed for `prefix` to end exactly at `start`
fn prefix_distance(text: &[char], prefix: &[char], start: usize, options: &MatchOptions) -> usize {
    if prefix.is_empty() {
        return 0;
    }
    if options.flex_context {
        let window = context_window(prefix.len(), options);
        let from = start.saturating_sub(window);
        let before: Vec<char> = text[from..start].iter().rev().copied().collect();
        let reversed: Vec<char> = prefix.iter().rev().copied().collect();
        anchored_distance(&reversed, &before)
    } else {
        (0..prefix.len())
            .filter(|&i| {
                let offset = prefix.len() - i;
                start < offset || text[start - offset] != prefix[i]
            })
            .count()
    }
}

/// Edits needed for `suffix` to start exactly at `end`
fn suffix_distance(text: &[char], suffix: &[char], end: usize, options: &MatchOptions) -> usize {
    if suffix.is_empty() {
        return 0;
    }
    if options.flex_context {
        let window = context_window(suffix.len(), options);
        let to = (end + window).min(text.len());
        anchored_distance(suffix, &text[end..to])
    } else {
        (0..suffix.len())
            .filter(|&i| text.get(end + i) != Some(&suffix[i]))
            .count()
    }
}

fn context_window(len: usize, options: &MatchOptions) -> usize {
    (2 * len).min(options.context_match_distance.max(len))
}

/// Edit distance from `pattern` to the best prefix of `text`
fn anchored_distance(pattern: &[char], text: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=text.len()).collect();
    let mut current = vec![0; text.len() + 1];

    for i in 1..=pattern.len() {
        current[0] = i;
        for j in 1..=text.len() {
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            current[j] = (previous[j - 1] + cost)
                .min(previous[j] + 1)
                .min(current[j - 1] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous.into_iter().min().unwrap_or(pattern.len())
}

fn rank(matches: &mut [TextMatch]) {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.start.cmp(&b.start))
    });
}
