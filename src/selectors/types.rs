//! Selector types following the Web Annotation data model
//!
//! These are the persisted form of an anchor. Field names are the wire
//! contract shared with existing annotation stores and must not change.
//!
//! Reference: <https://www.w3.org/TR/annotation-model/#selectors>

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Selector types for identifying a location in a document.
/// Several selectors for the same target provide fallbacks for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Selector {
    /// Id of an element
    #[serde(rename = "FragmentSelector")]
    Fragment {
        /// The element id
        value: String,
    },
    /// Container paths and UTF-16 code unit offsets
    #[serde(rename = "RangeSelector")]
    Range {
        /// Path of the start container element, relative to the root
        #[serde(rename = "startContainer")]
        start_container: String,
        /// Character offset within the start container's text
        #[serde(rename = "startOffset")]
        start_offset: usize,
        /// Path of the end container element, relative to the root
        #[serde(rename = "endContainer")]
        end_container: String,
        /// Character offset within the end container's text
        #[serde(rename = "endOffset")]
        end_offset: usize,
    },
    /// Character offsets into the root's text
    #[serde(rename = "TextPositionSelector")]
    TextPosition {
        /// Start character offset
        start: usize,
        /// End character offset (exclusive)
        end: usize,
    },
    /// Text quote with context
    #[serde(rename = "TextQuoteSelector")]
    TextQuote {
        /// The exact text that was selected
        exact: String,
        /// Text before the selection
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
        /// Text after the selection
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
    /// Any selector type this crate does not anchor (CSS, XPath, SVG, ...)
    #[serde(other)]
    Unsupported,
}

impl Selector {
    /// The wire `type` tag
    pub fn type_name(&self) -> &'static str {
        match self {
            Selector::Fragment { .. } => "FragmentSelector",
            Selector::Range { .. } => "RangeSelector",
            Selector::TextPosition { .. } => "TextPositionSelector",
            Selector::TextQuote { .. } => "TextQuoteSelector",
            Selector::Unsupported => "Unsupported",
        }
    }

    /// Create a text quote selector
    pub fn text_quote(exact: &str, prefix: Option<&str>, suffix: Option<&str>) -> Self {
        Selector::TextQuote {
            exact: exact.to_string(),
            prefix: prefix.map(|s| s.to_string()),
            suffix: suffix.map(|s| s.to_string()),
        }
    }

    /// Parse a single selector from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The target of an annotation: a source document and every selector
/// captured for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationTarget {
    /// Source document (spine item href)
    pub source: String,
    /// Multiple selectors for robust anchoring
    #[serde(rename = "selector", default)]
    pub selectors: Vec<Selector>,
}

impl AnnotationTarget {
    /// Create a target with multiple selectors
    pub fn with_selectors(source: &str, selectors: Vec<Selector>) -> Self {
        Self {
            source: source.to_string(),
            selectors,
        }
    }

    /// Get the fragment id if available
    pub fn fragment(&self) -> Option<&str> {
        self.selectors.iter().find_map(|s| match s {
            Selector::Fragment { value } => Some(value.as_str()),
            _ => None,
        })
    }

    /// Get the text position selector if available
    pub fn text_position(&self) -> Option<(usize, usize)> {
        self.selectors.iter().find_map(|s| match s {
            Selector::TextPosition { start, end } => Some((*start, *end)),
            _ => None,
        })
    }

    /// Get the quoted text if available
    pub fn text_quote(&self) -> Option<&str> {
        self.selectors.iter().find_map(|s| match s {
            Selector::TextQuote { exact, .. } => Some(exact.as_str()),
            _ => None,
        })
    }

    /// Add a text quote selector
    pub fn add_text_quote(&mut self, exact: &str, prefix: Option<&str>, suffix: Option<&str>) {
        self.selectors
            .push(Selector::text_quote(exact, prefix, suffix));
    }

    /// Add a text position selector
    pub fn add_text_position(&mut self, start: usize, end: usize) {
        self.selectors.push(Selector::TextPosition { start, end });
    }
}
