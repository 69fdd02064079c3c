//! Tag model.
//!
//! # Invariants
//! - `name` is unique across the tag table.
//! - Documents hold tag names; a rename only reaches documents when the
//!   store cascades it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable tag identifier.
pub type TagId = Uuid;

/// Tag metadata owned by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Optional `#rgb` / `#rrggbb` background color.
    pub color: Option<String>,
}

/// Fields for tag create/update commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDraft {
    pub name: String,
    pub color: Option<String>,
}

impl TagDraft {
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Normalizes one tag name: trims whitespace, rejects blanks.
///
/// Case is preserved; lookups are exact-name matches.
pub fn normalize_tag_name(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalizes and deduplicates tag names, keeping first-seen order.
pub fn normalize_tag_names(tags: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::with_capacity(tags.len());
    for tag in tags {
        if let Some(value) = normalize_tag_name(tag) {
            if seen.insert(value.clone()) {
                ordered.push(value);
            }
        }
    }
    ordered
}
