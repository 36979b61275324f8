//! Text position anchor: start and end offsets in the coordinate space

use super::{Anchor, AnchorContext, AnchorKind};
use crate::error::{AnchorError, Result};
use crate::selectors::Selector;
use crate::text::SeekMode;
use crate::tree::{DocumentTree, TextRange};

/// UTF-16 code unit offsets into the text of a coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPositionAnchor {
    start: usize,
    end: usize,
}

impl TextPositionAnchor {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(AnchorError::InvalidPosition { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn kind(&self) -> AnchorKind {
        AnchorKind::TextPosition
    }
}

impl<T: DocumentTree> Anchor<T> for TextPositionAnchor {
    fn from_range(ctx: &AnchorContext<'_, T>, range: &TextRange<T::Node>) -> Result<Self> {
        let (start, end) = ctx.space.offsets_of(range)?;
        Self::new(start, end)
    }

    fn from_selector(_ctx: &AnchorContext<'_, T>, selector: &Selector) -> Result<Self> {
        match selector {
            Selector::TextPosition { start, end } => Self::new(*start, *end),
            other => Err(AnchorError::SelectorMismatch {
                expected: AnchorKind::TextPosition.selector_type(),
                found: other.type_name(),
            }),
        }
    }

    fn to_range(&self, ctx: &AnchorContext<'_, T>) -> Result<TextRange<T::Node>> {
        let out_of_range = |offset: usize| AnchorError::OffsetOutOfRange {
            offset: offset as isize,
            length: ctx.space.len(),
        };
        let start = isize::try_from(self.start).map_err(|_| out_of_range(self.start))?;
        let length = isize::try_from(self.len()).map_err(|_| out_of_range(self.end))?;

        let mut walker = ctx.space.walker();
        walker.seek(start, SeekMode::Absolute)?;
        let start = walker.boundary().ok_or_else(|| out_of_range(self.start))?;

        walker.seek(length, SeekMode::Relative)?;
        let end = walker.boundary().ok_or_else(|| out_of_range(self.end))?;

        Ok(TextRange::new(start, end))
    }

    fn to_selector(&self, _ctx: &AnchorContext<'_, T>) -> Result<Selector> {
        Ok(Selector::TextPosition {
            start: self.start,
            end: self.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextSpace;
    use roxmltree::{Document, NodeId};

    const CHAPTER: &str = concat!(
        "<body>",
        "<p>The quick <b>brown</b> fox</p>",
        "<p><span class=\"ll-badge\">3</span>jumps over the lazy dog</p>",
        "</body>"
    );

    #[test]
    fn test_invalid_position() {
        assert!(matches!(
            TextPositionAnchor::new(5, 2),
            Err(AnchorError::InvalidPosition { start: 5, end: 2 })
        ));
        assert!(TextPositionAnchor::new(3, 3).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_every_span() {
        let doc = Document::parse(CHAPTER).unwrap();
        let space = TextSpace::new(&doc, doc.root_element().id());
        let ctx = AnchorContext::new(space);
        let len = space.len();

        for start in 0..=len {
            for end in start..=len {
                let anchor = TextPositionAnchor::new(start, end).unwrap();
                let range = anchor.to_range(&ctx).unwrap();
                let back = TextPositionAnchor::from_range(&ctx, &range).unwrap();

                assert_eq!(back, anchor, "span {}..{}", start, end);
                assert_eq!(space.range_text(&range).unwrap().encode_utf16().count(), end - start);
            }
        }
    }

    #[test]
    fn test_filtered_space() {
        let doc = Document::parse(CHAPTER).unwrap();
        let filter = |n: NodeId| doc.attribute(n, "class") != Some("ll-badge");
        let space = TextSpace::new(&doc, doc.root_element().id()).with_filter(&filter);
        let ctx = AnchorContext::new(space);

        let anchor = TextPositionAnchor::new(19, 24).unwrap();
        let range = anchor.to_range(&ctx).unwrap();
        assert_eq!(space.range_text(&range).unwrap(), "jumps");
    }

    #[test]
    fn test_multibyte_offsets() {
        let doc = Document::parse("<p>naïve café <i>crème</i> brûlée</p>").unwrap();
        let space = TextSpace::new(&doc, doc.root_element().id());
        let ctx = AnchorContext::new(space);

        let range = TextPositionAnchor::new(11, 16).unwrap().to_range(&ctx).unwrap();
        assert_eq!(space.range_text(&range).unwrap(), "crème");
    }

    #[test]
    fn test_astral_offsets() {
        let doc = Document::parse("<p>\u{1F600} brown fox</p>").unwrap();
        let root = doc.root_element().id();
        let space = TextSpace::new(&doc, root);
        let ctx = AnchorContext::new(space);
        let text = doc.first_child(root).unwrap();

        // The emoji is a surrogate pair, two code units wide
        let anchor = TextPositionAnchor::from_range(&ctx, &TextRange::between(text, 3, text, 12)).unwrap();
        assert_eq!((anchor.start(), anchor.end()), (3, 12));

        let range = anchor.to_range(&ctx).unwrap();
        assert_eq!(space.range_text(&range).unwrap(), "brown fox");
    }

    #[test]
    fn test_out_of_range() {
        let doc = Document::parse(CHAPTER).unwrap();
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()));

        let anchor = TextPositionAnchor::new(10, 500).unwrap();
        assert!(matches!(
            anchor.to_range(&ctx),
            Err(AnchorError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn test_selector() {
        let doc = Document::parse(CHAPTER).unwrap();
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()));

        let anchor = TextPositionAnchor::from_selector(
            &ctx,
            &Selector::TextPosition { start: 4, end: 9 },
        )
        .unwrap();
        assert_eq!((anchor.start(), anchor.end()), (4, 9));
        assert_eq!(
            anchor.to_selector(&ctx).unwrap().to_json().unwrap(),
            r#"{"type":"TextPositionSelector","start":4,"end":9}"#
        );
        assert!(matches!(
            TextPositionAnchor::from_selector(&ctx, &Selector::text_quote("x", None, None)),
            Err(AnchorError::SelectorMismatch { .. })
        ));
    }
}
