//! Text quote anchor: quoted text plus surrounding context
//!
//! Resolution goes through the approximate matcher, so a quote survives
//! edits that shift or slightly alter the text. Short quotes without context
//! are too ambiguous to search for and fail without a search.

use serde::{Deserialize, Serialize};

use super::{Anchor, AnchorContext, AnchorKind, TextPositionAnchor};
use crate::error::{AnchorError, Result};
use crate::matcher::{ContextQuery, MatchOptions, PatternQuery};
use crate::selectors::Selector;
use crate::text::{char_index, unit_index};
use crate::tree::{DocumentTree, TextRange};

/// Where a quote was last seen, used to prefer nearby matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionHint {
    pub start: usize,
    pub end: usize,
}

/// Quote with optional context and position hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuoteAnchor {
    quote: String,
    prefix: Option<String>,
    suffix: Option<String>,
    hint: Option<PositionHint>,
}

impl TextQuoteAnchor {
    pub fn new(
        quote: impl Into<String>,
        prefix: Option<String>,
        suffix: Option<String>,
    ) -> Result<Self> {
        let quote = quote.into();
        if quote.is_empty() {
            return Err(AnchorError::MissingParameter("quote"));
        }
        Ok(Self {
            quote,
            prefix,
            suffix,
            hint: None,
        })
    }

    /// Load a quote selector, keeping `hint` (usually from a position
    /// selector captured alongside it)
    pub fn from_selector_with_hint(selector: &Selector, hint: Option<PositionHint>) -> Result<Self> {
        match selector {
            Selector::TextQuote {
                exact,
                prefix,
                suffix,
            } => Ok(Self::new(exact.as_str(), prefix.clone(), suffix.clone())?.with_hint(hint)),
            other => Err(AnchorError::SelectorMismatch {
                expected: AnchorKind::TextQuote.selector_type(),
                found: other.type_name(),
            }),
        }
    }

    pub fn with_hint(mut self, hint: Option<PositionHint>) -> Self {
        self.hint = hint;
        self
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Context before the quote. An empty prefix reads as no prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|s| !s.is_empty())
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref().filter(|s| !s.is_empty())
    }

    pub fn hint(&self) -> Option<PositionHint> {
        self.hint
    }

    pub fn kind(&self) -> AnchorKind {
        AnchorKind::TextQuote
    }
}

impl<T: DocumentTree> Anchor<T> for TextQuoteAnchor {
    fn from_range(ctx: &AnchorContext<'_, T>, range: &TextRange<T::Node>) -> Result<Self> {
        let (start, end) = ctx.space.offsets_of(range)?;
        let text = ctx.space.text();
        let corpus: Vec<char> = text.chars().collect();
        let last = char_index(&text, end);
        let first = char_index(&text, start).min(last);
        let context = ctx.config.context_length;

        let quote: String = corpus[first..last].iter().collect();
        let prefix: String = corpus[first.saturating_sub(context)..first].iter().collect();
        let suffix: String = corpus[last..(last + context).min(corpus.len())]
            .iter()
            .collect();

        let non_empty = |s: String| Some(s).filter(|s| !s.is_empty());
        Ok(Self::new(quote, non_empty(prefix), non_empty(suffix))?
            .with_hint(Some(PositionHint { start, end })))
    }

    fn from_selector(_ctx: &AnchorContext<'_, T>, selector: &Selector) -> Result<Self> {
        Self::from_selector_with_hint(selector, None)
    }

    fn to_range(&self, ctx: &AnchorContext<'_, T>) -> Result<TextRange<T::Node>> {
        let corpus = ctx.space.text();
        let options = MatchOptions::from_config(corpus.chars().count(), &ctx.config);
        // The matcher works in chars, hints and results are code units
        let hint_start = self.hint.map(|hint| char_index(&corpus, hint.start));
        let hint_end = self.hint.map(|hint| char_index(&corpus, hint.end));

        let results = match (self.prefix(), self.suffix()) {
            (Some(prefix), Some(suffix)) => {
                let query = ContextQuery {
                    prefix,
                    suffix,
                    pattern: &self.quote,
                    hint_start,
                    hint_end,
                    bias_to_hint: true,
                };
                ctx.matcher
                    .search_fuzzy_with_context(&corpus, &query, &options)
            }
            _ if self.quote.chars().count() >= ctx.config.min_context_free_quote => {
                let query = PatternQuery {
                    pattern: &self.quote,
                    hint_start,
                    bias_to_hint: true,
                };
                ctx.matcher.search_fuzzy(&corpus, &query, &options)
            }
            _ => {
                tracing::debug!(
                    "Quote of {} characters is too short to search without context",
                    self.quote.chars().count()
                );
                return Err(AnchorError::NoMatchFound);
            }
        };

        let best = results.best().ok_or(AnchorError::NoMatchFound)?;
        tracing::debug!(
            start = best.start,
            end = best.end,
            score = best.score,
            "Quote matched"
        );
        TextPositionAnchor::new(unit_index(&corpus, best.start), unit_index(&corpus, best.end))?
            .to_range(ctx)
    }

    fn to_selector(&self, _ctx: &AnchorContext<'_, T>) -> Result<Selector> {
        Ok(Selector::TextQuote {
            exact: self.quote.clone(),
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnchorConfig;
    use crate::matcher::{ApproximateMatcher, MatchResults, TextMatch};
    use crate::text::TextSpace;
    use roxmltree::Document;
    use std::cell::RefCell;

    /// Records every call and answers with a fixed match
    #[derive(Default)]
    struct RecordingMatcher {
        calls: RefCell<Vec<(&'static str, MatchOptions)>>,
        answer: Option<TextMatch>,
    }

    impl RecordingMatcher {
        fn answering(start: usize, end: usize) -> Self {
            Self {
                calls: RefCell::default(),
                answer: Some(TextMatch {
                    start,
                    end,
                    score: 1.0,
                }),
            }
        }

        fn results(&self) -> MatchResults {
            MatchResults {
                matches: self.answer.into_iter().collect(),
            }
        }
    }

    impl ApproximateMatcher for RecordingMatcher {
        fn search_fuzzy_with_context(
            &self,
            _corpus: &str,
            _query: &ContextQuery<'_>,
            options: &MatchOptions,
        ) -> MatchResults {
            self.calls.borrow_mut().push(("context", options.clone()));
            self.results()
        }

        fn search_fuzzy(
            &self,
            _corpus: &str,
            _query: &PatternQuery<'_>,
            options: &MatchOptions,
        ) -> MatchResults {
            self.calls.borrow_mut().push(("pattern", options.clone()));
            self.results()
        }
    }

    const ORIGINAL: &str = "<body><p>The quick brown fox jumps over the lazy dog</p></body>";
    const EDITED: &str = "<body><p>The red quick <em>brown</em> fox jumps over the lazy dog</p></body>";

    #[test]
    fn test_capture_context() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let root = doc.root_element().id();
        let ctx = AnchorContext::new(TextSpace::new(&doc, root));
        let range = TextPositionAnchor::new(10, 19).unwrap().to_range(&ctx).unwrap();

        let anchor = TextQuoteAnchor::from_range(&ctx, &range).unwrap();
        assert_eq!(anchor.quote(), "brown fox");
        assert_eq!(anchor.prefix(), Some("The quick "));
        assert_eq!(anchor.suffix(), Some(" jumps over the lazy dog"));
        assert_eq!(anchor.hint(), Some(PositionHint { start: 10, end: 19 }));
    }

    #[test]
    fn test_context_clamped_to_window() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id())).with_config(
            AnchorConfig {
                context_length: 4,
                ..AnchorConfig::default()
            },
        );
        let range = TextPositionAnchor::new(10, 19).unwrap().to_range(&ctx).unwrap();

        let anchor = TextQuoteAnchor::from_range(&ctx, &range).unwrap();
        assert_eq!(anchor.prefix(), Some("ick "));
        assert_eq!(anchor.suffix(), Some(" jum"));
    }

    #[test]
    fn test_empty_quote() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()));
        let range = TextPositionAnchor::new(4, 4).unwrap().to_range(&ctx).unwrap();

        assert!(matches!(
            TextQuoteAnchor::from_range(&ctx, &range),
            Err(AnchorError::MissingParameter("quote"))
        ));
    }

    #[test]
    fn test_fidelity() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let space = TextSpace::new(&doc, doc.root_element().id());
        let ctx = AnchorContext::new(space);

        for (start, end) in [(4, 9), (10, 19), (20, 30), (35, 39)] {
            let range = TextPositionAnchor::new(start, end).unwrap().to_range(&ctx).unwrap();
            let anchor = TextQuoteAnchor::from_range(&ctx, &range).unwrap();
            let resolved = anchor.to_range(&ctx).unwrap();

            assert_eq!(
                space.range_text(&resolved).unwrap(),
                space.text_between(start, end)
            );
        }
    }

    #[test]
    fn test_resilient_to_insertion() {
        let original = Document::parse(ORIGINAL).unwrap();
        let original_ctx = AnchorContext::new(TextSpace::new(&original, original.root_element().id()));
        let range = TextPositionAnchor::new(10, 19)
            .unwrap()
            .to_range(&original_ctx)
            .unwrap();
        let selector = TextQuoteAnchor::from_range(&original_ctx, &range)
            .unwrap()
            .to_selector(&original_ctx)
            .unwrap();

        let edited = Document::parse(EDITED).unwrap();
        let space = TextSpace::new(&edited, edited.root_element().id());
        let ctx = AnchorContext::new(space);
        let anchor = TextQuoteAnchor::from_selector_with_hint(
            &selector,
            Some(PositionHint { start: 10, end: 19 }),
        )
        .unwrap();
        let resolved = anchor.to_range(&ctx).unwrap();

        assert_eq!(space.range_text(&resolved).unwrap(), "brown fox");
        assert_eq!(space.offsets_of(&resolved).unwrap(), (14, 23));

        // The stored offsets alone now point at the wrong text
        let stale = TextPositionAnchor::new(10, 19).unwrap().to_range(&ctx).unwrap();
        assert_eq!(space.range_text(&stale).unwrap(), "ick brown");
    }

    #[test]
    fn test_offsets_count_utf16_units() {
        let doc = Document::parse("<body><p>\u{1F600} brown fox jumps over the lazy dog</p></body>")
            .unwrap();
        let space = TextSpace::new(&doc, doc.root_element().id());
        let ctx = AnchorContext::new(space);
        let range = TextPositionAnchor::new(3, 12).unwrap().to_range(&ctx).unwrap();

        let anchor = TextQuoteAnchor::from_range(&ctx, &range).unwrap();
        assert_eq!(anchor.quote(), "brown fox");
        assert_eq!(anchor.prefix(), Some("\u{1F600} "));
        assert_eq!(anchor.hint(), Some(PositionHint { start: 3, end: 12 }));

        let resolved = anchor.to_range(&ctx).unwrap();
        assert_eq!(space.offsets_of(&resolved).unwrap(), (3, 12));
        assert_eq!(space.range_text(&resolved).unwrap(), "brown fox");
    }

    #[test]
    fn test_selector_round_trip() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()));

        for selector in [
            Selector::TextQuote {
                exact: "brown fox".to_string(),
                prefix: Some("The quick ".to_string()),
                suffix: Some(" jumps".to_string()),
            },
            Selector::TextQuote {
                exact: "The quick".to_string(),
                prefix: Some(String::new()),
                suffix: Some(" brown".to_string()),
            },
            Selector::TextQuote {
                exact: "lazy dog".to_string(),
                prefix: None,
                suffix: None,
            },
        ] {
            let anchor = TextQuoteAnchor::from_selector(&ctx, &selector).unwrap();
            assert_eq!(anchor.to_selector(&ctx).unwrap(), selector);
        }
    }

    #[test]
    fn test_empty_context_reads_as_absent() {
        let anchor = TextQuoteAnchor::new("quick", Some(String::new()), Some(" brown".to_string()))
            .unwrap();
        assert_eq!(anchor.prefix(), None);
        assert_eq!(anchor.suffix(), Some(" brown"));
    }

    #[test]
    fn test_short_quote_without_context_is_not_searched() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let matcher = RecordingMatcher::answering(4, 9);
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()))
            .with_matcher(&matcher);

        let anchor = TextQuoteAnchor::new("quick", Some("The ".to_string()), None).unwrap();
        assert!(matches!(anchor.to_range(&ctx), Err(AnchorError::NoMatchFound)));
        assert!(matcher.calls.borrow().is_empty());
    }

    #[test]
    fn test_long_quote_without_context_uses_pattern_search() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let matcher = RecordingMatcher::answering(4, 43);
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()))
            .with_matcher(&matcher);

        let anchor = TextQuoteAnchor::new("quick brown fox jumps over the lazy dog", None, None).unwrap();
        let range = anchor.to_range(&ctx).unwrap();

        assert_eq!(ctx.space.offsets_of(&range).unwrap(), (4, 43));
        let calls = matcher.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "pattern");
    }

    #[test]
    fn test_search_options() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let matcher = RecordingMatcher::answering(10, 19);
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()))
            .with_matcher(&matcher);

        let anchor = TextQuoteAnchor::new(
            "brown fox",
            Some("The quick ".to_string()),
            Some(" jumps".to_string()),
        )
        .unwrap();
        anchor.to_range(&ctx).unwrap();

        let calls = matcher.calls.borrow();
        let (kind, options) = &calls[0];
        assert_eq!(*kind, "context");
        assert_eq!(options.match_distance, 86);
        assert_eq!(options.context_match_distance, 86);
        assert!((options.pattern_match_threshold - 0.5).abs() < f64::EPSILON);
        assert!((options.context_match_threshold - 0.5).abs() < f64::EPSILON);
        assert!(options.flex_context);
        assert!(options.with_fuzzy_comparison);
    }

    #[test]
    fn test_no_match() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let matcher = RecordingMatcher::default();
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()))
            .with_matcher(&matcher);

        let anchor = TextQuoteAnchor::new(
            "brown fox",
            Some("The quick ".to_string()),
            Some(" jumps".to_string()),
        )
        .unwrap();
        assert!(matches!(anchor.to_range(&ctx), Err(AnchorError::NoMatchFound)));
    }

    #[test]
    fn test_selector_omits_empty_context_and_hint() {
        let doc = Document::parse(ORIGINAL).unwrap();
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()));
        let range = TextPositionAnchor::new(0, 3).unwrap().to_range(&ctx).unwrap();

        let anchor = TextQuoteAnchor::from_range(&ctx, &range).unwrap();
        assert_eq!(anchor.prefix(), None);
        assert_eq!(
            anchor.to_selector(&ctx).unwrap().to_json().unwrap(),
            r#"{"type":"TextQuoteSelector","exact":"The","suffix":" quick brown fox jumps over the "}"#
        );
    }
}
