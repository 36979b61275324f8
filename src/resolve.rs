//! Capture and resolution across every anchor kind
//!
//! [`describe`] records a range with every selector that can express it.
//! [`resolve`] takes them back in order of precision: the structural
//! selectors are exact but break on any edit, so their result is only
//! trusted when it still reads as the quoted text. The quote selector is the
//! fallback that survives edits.

use crate::anchors::{
    Anchor, AnchorContext, AnchorKind, FragmentAnchor, PositionHint, RangeAnchor,
    TextPositionAnchor, TextQuoteAnchor,
};
use crate::error::{AnchorError, Result};
use crate::selectors::Selector;
use crate::tree::{DocumentTree, TextRange};

/// A resolved range and the anchor kind that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<N> {
    pub range: TextRange<N>,
    pub kind: AnchorKind,
}

/// Every selector that can describe `range`
pub fn describe<T: DocumentTree>(
    ctx: &AnchorContext<'_, T>,
    range: &TextRange<T::Node>,
) -> Result<Vec<Selector>> {
    let mut selectors = Vec::with_capacity(4);

    selectors.push(RangeAnchor::from_range(ctx, range)?.to_selector(ctx)?);
    selectors.push(TextPositionAnchor::from_range(ctx, range)?.to_selector(ctx)?);

    match TextQuoteAnchor::from_range(ctx, range) {
        Ok(quote) => selectors.push(quote.to_selector(ctx)?),
        Err(AnchorError::MissingParameter(_)) => {
            tracing::debug!("Collapsed range, no quote selector");
        }
        Err(e) => return Err(e),
    }

    if let Ok(fragment) = FragmentAnchor::from_range(ctx, range) {
        selectors.push(fragment.to_selector(ctx)?);
    }

    Ok(selectors)
}

/// Resolve a single selector with the anchor kind that reads it
pub fn resolve_selector<T: DocumentTree>(
    ctx: &AnchorContext<'_, T>,
    selector: &Selector,
) -> Result<Resolution<T::Node>> {
    let (range, kind) = match selector {
        Selector::Fragment { .. } => (
            FragmentAnchor::from_selector(ctx, selector)?.to_range(ctx)?,
            AnchorKind::Fragment,
        ),
        Selector::Range { .. } => (
            RangeAnchor::from_selector(ctx, selector)?.to_range(ctx)?,
            AnchorKind::Range,
        ),
        Selector::TextPosition { .. } => (
            TextPositionAnchor::from_selector(ctx, selector)?.to_range(ctx)?,
            AnchorKind::TextPosition,
        ),
        Selector::TextQuote { .. } => (
            TextQuoteAnchor::from_selector(ctx, selector)?.to_range(ctx)?,
            AnchorKind::TextQuote,
        ),
        Selector::Unsupported => {
            return Err(AnchorError::NotImplemented(
                "no anchor reads this selector type".to_string(),
            ))
        }
    };
    Ok(Resolution { range, kind })
}

/// Resolve the best range for a set of selectors captured together.
///
/// Order: range, then text position (each accepted only when its text
/// equals the quote, if there is one), then text quote hinted by the text
/// position, then fragment when no text selector exists at all.
pub fn resolve<T: DocumentTree>(
    ctx: &AnchorContext<'_, T>,
    selectors: &[Selector],
) -> Result<Resolution<T::Node>> {
    let range_selector = selectors
        .iter()
        .find(|s| matches!(s, Selector::Range { .. }));
    let position_selector = selectors
        .iter()
        .find(|s| matches!(s, Selector::TextPosition { .. }));
    let quote_selector = selectors
        .iter()
        .find(|s| matches!(s, Selector::TextQuote { .. }));
    let fragment_selector = selectors
        .iter()
        .find(|s| matches!(s, Selector::Fragment { .. }));

    let exact = match quote_selector {
        Some(Selector::TextQuote { exact, .. }) => Some(exact.as_str()),
        _ => None,
    };

    let mut last_error = selectors
        .iter()
        .find(|s| matches!(s, Selector::Unsupported))
        .and_then(|s| resolve_selector(ctx, s).err());

    for selector in [range_selector, position_selector].into_iter().flatten() {
        match resolve_selector(ctx, selector).and_then(|found| verify(ctx, found, exact)) {
            Ok(found) => return Ok(found),
            Err(e) => {
                tracing::debug!(selector = selector.type_name(), error = %e, "Anchoring failed");
                last_error = Some(e);
            }
        }
    }

    if let Some(selector) = quote_selector {
        let hint = match position_selector {
            Some(Selector::TextPosition { start, end }) => Some(PositionHint {
                start: *start,
                end: *end,
            }),
            _ => None,
        };
        let attempt = TextQuoteAnchor::from_selector_with_hint(selector, hint)
            .and_then(|anchor| anchor.to_range(ctx));
        match attempt {
            Ok(range) => {
                return Ok(Resolution {
                    range,
                    kind: AnchorKind::TextQuote,
                })
            }
            Err(e) => {
                tracing::debug!(selector = selector.type_name(), error = %e, "Anchoring failed");
                last_error = Some(e);
            }
        }
    }

    let has_text_selector =
        range_selector.is_some() || position_selector.is_some() || quote_selector.is_some();
    if let Some(selector) = fragment_selector.filter(|_| !has_text_selector) {
        match resolve_selector(ctx, selector) {
            Ok(found) => return Ok(found),
            Err(e) => {
                tracing::debug!(selector = selector.type_name(), error = %e, "Anchoring failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(AnchorError::NoMatchFound))
}

/// Accept a structural result only if it still reads as the quote
fn verify<T: DocumentTree>(
    ctx: &AnchorContext<'_, T>,
    found: Resolution<T::Node>,
    exact: Option<&str>,
) -> Result<Resolution<T::Node>> {
    let Some(exact) = exact else {
        return Ok(found);
    };
    let text = ctx.space.range_text(&found.range)?;
    if text != exact {
        return Err(AnchorError::InvalidRange(format!(
            "{} anchor now reads {:?}, expected {:?}",
            found.kind, text, exact
        )));
    }
    Ok(found)
}
