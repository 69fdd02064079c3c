//! Input validation performed before any collaborator command.
//!
//! # Invariants
//! - Validation never calls the collaborator.
//! - A rejected input leaves organizer state unchanged apart from status text.

use crate::model::folder::{Folder, FolderId};
use crate::tags::is_hex_color;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// User input rejected before any external call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required name is blank after trim.
    BlankName { field: &'static str },
    /// Monthly schedule submitted with no selected days.
    EmptyScheduleDays,
    /// Priority outside 1..=3.
    InvalidPriority(i64),
    /// Color is present but not `#rgb` / `#rrggbb`.
    InvalidColor(String),
    /// Parent assignment would make a folder its own ancestor.
    FolderCycle {
        folder_id: FolderId,
        parent_id: FolderId,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { field } => write!(f, "{field} must not be blank"),
            Self::EmptyScheduleDays => {
                write!(f, "select at least one day for a monthly schedule")
            }
            Self::InvalidPriority(value) => {
                write!(f, "priority must be 1, 2 or 3, got {value}")
            }
            Self::InvalidColor(value) => write!(f, "invalid color `{value}`"),
            Self::FolderCycle {
                folder_id,
                parent_id,
            } => write!(
                f,
                "folder {folder_id} cannot be moved under its descendant {parent_id}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Trims a required name, rejecting blanks.
pub fn require_name(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName { field });
    }
    Ok(trimmed.to_string())
}

/// Accepts `None` or a well-formed hex color.
pub fn check_color(color: Option<&str>) -> Result<(), ValidationError> {
    match color {
        Some(value) if !is_hex_color(value) => Err(ValidationError::InvalidColor(value.to_string())),
        _ => Ok(()),
    }
}

/// Rejects parent assignments that would create a cycle.
pub fn check_folder_parent(
    folders: &[Folder],
    folder_id: FolderId,
    parent_id: Option<FolderId>,
) -> Result<(), ValidationError> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    if crate::folders::would_create_cycle(folders, folder_id, parent_id) {
        return Err(ValidationError::FolderCycle {
            folder_id,
            parent_id,
        });
    }
    Ok(())
}
