//! Shared view over notes and habits.
//!
//! Ordering, local filtering and selection reconciliation only need the
//! fields exposed here, so they are written once for both document kinds.

use crate::model::habit::Habit;
use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of any document kind.
pub type DocumentId = Uuid;

/// Document kinds handled by the organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Note,
    Habit,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Habit => "habit",
        }
    }
}

/// Boolean flags toggled through `toggle_flag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFlag {
    /// Note pin state.
    Pinned,
    /// Note archive state.
    Archived,
    /// Habit active state.
    Active,
}

impl DocumentFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pinned => "pinned",
            Self::Archived => "archived",
            Self::Active => "active",
        }
    }
}

/// Read-only accessors shared by notes and habits.
pub trait Document: Clone {
    /// Draft shape accepted by create/update commands.
    type Draft;

    const KIND: DocumentKind;

    fn id(&self) -> DocumentId;
    fn title(&self) -> &str;
    /// Free text searched by the local fallback filter.
    fn body(&self) -> &str;
    fn tags(&self) -> &[String];
    fn is_pinned(&self) -> bool;
    fn is_archived(&self) -> bool;
    /// Epoch milliseconds.
    fn updated_at(&self) -> i64;
    /// Secondary line shown under the title in list rows.
    fn subtitle(&self) -> Option<String>;
}

impl Document for Note {
    type Draft = crate::model::note::NoteDraft;

    const KIND: DocumentKind = DocumentKind::Note;

    fn id(&self) -> DocumentId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.content
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    fn is_archived(&self) -> bool {
        self.is_archived
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn subtitle(&self) -> Option<String> {
        crate::model::note::note_excerpt(&self.content)
    }
}

impl Document for Habit {
    type Draft = crate::model::habit::HabitDraft;

    const KIND: DocumentKind = DocumentKind::Habit;

    fn id(&self) -> DocumentId {
        self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn body(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn is_pinned(&self) -> bool {
        false
    }

    fn is_archived(&self) -> bool {
        false
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn subtitle(&self) -> Option<String> {
        Some(self.frequency.describe())
    }
}
