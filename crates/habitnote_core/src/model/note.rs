//! Note model and markdown excerpt projection.
//!
//! # Responsibility
//! - Define the note record and its create/update draft.
//! - Derive the plain-text excerpt shown in list rows.
//!
//! # Invariants
//! - `updated_at` changes on every content or metadata edit.
//! - `tags` is an ordered set of tag names.

use crate::model::folder::FolderId;
use crate::model::tag::normalize_tag_names;
use crate::validation::{check_color, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable note identifier.
pub type NoteId = Uuid;

/// Title used when a note is saved with a blank title.
pub const UNTITLED_NOTE: &str = "Untitled note";

const EXCERPT_MAX_CHARS: usize = 100;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Free-text document, optionally filed into a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub folder_id: Option<FolderId>,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub color: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds. Drives default ordering.
    pub updated_at: i64,
}

/// Fields for note create/update commands.
///
/// Update uses full replacement semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub folder_id: Option<FolderId>,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub color: Option<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Trims the title (blank becomes "Untitled note"), dedupes tags and
    /// checks the color.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        check_color(self.color.as_deref())?;
        let title = self.title.trim();
        Ok(Self {
            title: if title.is_empty() {
                UNTITLED_NOTE.to_string()
            } else {
                title.to_string()
            },
            tags: normalize_tag_names(&self.tags),
            ..self.clone()
        })
    }

    /// Builds a draft that rewrites `note` unchanged.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            folder_id: note.folder_id,
            tags: note.tags.clone(),
            is_pinned: note.is_pinned,
            is_archived: note.is_archived,
            color: note.color.clone(),
        }
    }
}

/// Derives the list-row excerpt from markdown content.
///
/// Images are dropped, links keep their label, markdown symbols are
/// stripped, whitespace is collapsed and the first 100 chars are kept.
pub fn note_excerpt(content: &str) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(EXCERPT_MAX_CHARS).collect())
    }
}
