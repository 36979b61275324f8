//! Persisted selectors
//!
//! A selector is the serializable description of one anchor. Annotations
//! store several for the same target so resolution can fall back from the
//! precise kinds to the resilient quote.

mod types;

pub use types::{AnnotationTarget, Selector};
