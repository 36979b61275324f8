//! Text Anchoring Library
//!
//! Re-locates annotated text inside a document tree after the document was
//! reloaded, re-rendered or lightly edited.
//!
//! # Modules
//!
//! - `selectors`: Web Annotation selectors, the persisted form of an anchor
//! - `tree`: read-only document tree access and live ranges
//! - `text`: linear UTF-16 coordinates and the offset walker
//! - `anchors`: fragment, range, text position and text quote anchors
//! - `matcher`: approximate text search port and the bundled matcher
//! - `resolve`: capture a range with every selector, resolve the best one
//!
//! # Example
//!
//! ```
//! use text_anchoring::{describe, resolve, AnchorContext, TextSpace};
//! use text_anchoring::anchors::{Anchor, TextPositionAnchor};
//!
//! let doc = roxmltree::Document::parse("<p>The quick brown fox</p>").unwrap();
//! let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()));
//!
//! let range = TextPositionAnchor::new(10, 19).unwrap().to_range(&ctx).unwrap();
//! let selectors = describe(&ctx, &range).unwrap();
//!
//! let found = resolve(&ctx, &selectors).unwrap();
//! assert_eq!(ctx.space.range_text(&found.range).unwrap(), "brown fox");
//! ```

pub mod anchors;
pub mod config;
pub mod error;
pub mod matcher;
pub mod resolve;
pub mod selectors;
pub mod text;
pub mod tree;

pub use anchors::{Anchor, AnchorContext, AnchorKind};
pub use config::AnchorConfig;
pub use error::{AnchorError, Result};
pub use matcher::{ApproximateMatcher, FuzzyMatcher, MatchOptions};
pub use resolve::{describe, resolve, Resolution};
pub use selectors::{AnnotationTarget, Selector};
pub use text::{SeekMode, TextSpace, TextWalker};
pub use tree::{Boundary, DocumentTree, IgnoreSelector, TextRange};
