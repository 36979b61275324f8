//! Element matching for markup injected by the reader itself
//!
//! Highlight wrappers and similar elements must not perturb stored
//! addresses. They are described with a small subset of CSS selector
//! syntax, e.g. `span.ll-highlight, [data-annotation-id]`.

use regex::Regex;

use super::DocumentTree;
use crate::error::{AnchorError, Result};

const COMPOUND_PATTERN: &str =
    r#"^(?P<tag>[A-Za-z][\w-]*|\*)?(?P<rest>(?:[.#][\w-]+|\[[\w-]+(?:=(?:"[^"]*"|'[^']*'|[^\]"']*))?\])*)$"#;

const PART_PATTERN: &str =
    r#"(?P<kind>[.#])(?P<name>[\w-]+)|\[(?P<attr>[\w-]+)(?:=(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\]"']*)))?\]"#;

/// A parsed list of compound selectors (comma separated alternatives)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSelector {
    source: String,
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl IgnoreSelector {
    /// Parse a selector list
    pub fn parse(source: &str) -> Result<Self> {
        let compound_regex = Regex::new(COMPOUND_PATTERN)
            .map_err(|e| AnchorError::InvalidSelector(e.to_string()))?;
        let part_regex =
            Regex::new(PART_PATTERN).map_err(|e| AnchorError::InvalidSelector(e.to_string()))?;

        let mut alternatives = Vec::new();
        for raw in source.split(',') {
            let raw = raw.trim();
            let caps = compound_regex
                .captures(raw)
                .filter(|_| !raw.is_empty())
                .ok_or_else(|| AnchorError::InvalidSelector(source.to_string()))?;

            let mut compound = Compound {
                tag: caps
                    .name("tag")
                    .map(|m| m.as_str())
                    .filter(|tag| *tag != "*")
                    .map(|tag| tag.to_ascii_lowercase()),
                ..Compound::default()
            };

            let rest = caps.name("rest").map_or("", |m| m.as_str());
            for part in part_regex.captures_iter(rest) {
                if let (Some(kind), Some(name)) = (part.name("kind"), part.name("name")) {
                    match kind.as_str() {
                        "#" => compound.ids.push(name.as_str().to_string()),
                        _ => compound.classes.push(name.as_str().to_string()),
                    }
                } else if let Some(attr) = part.name("attr") {
                    let value = part
                        .name("dq")
                        .or_else(|| part.name("sq"))
                        .or_else(|| part.name("bare"))
                        .map(|m| m.as_str().to_string());
                    compound
                        .attributes
                        .push((attr.as_str().to_string(), value));
                }
            }

            alternatives.push(compound);
        }

        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    /// The selector text this was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether an element matches any alternative. Non-elements never match.
    pub fn matches<T: DocumentTree>(&self, tree: &T, node: T::Node) -> bool {
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        self.alternatives
            .iter()
            .any(|compound| compound.matches(tree, node, tag))
    }
}

impl Compound {
    fn matches<T: DocumentTree>(&self, tree: &T, node: T::Node, tag: &str) -> bool {
        if let Some(ref expected) = self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if !self
            .ids
            .iter()
            .all(|id| tree.attribute(node, "id") == Some(id.as_str()))
        {
            return false;
        }

        if !self.classes.is_empty() {
            let classes = tree.attribute(node, "class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|class| classes.split_whitespace().any(|c| c == class))
            {
                return false;
            }
        }

        self.attributes
            .iter()
            .all(|(name, value)| match (tree.attribute(node, name), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            })
    }
}
