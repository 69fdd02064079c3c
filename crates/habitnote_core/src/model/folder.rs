//! Folder model.
//!
//! Folders form a forest through `parent_id`. `None` means root level.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable folder identifier.
pub type FolderId = Uuid;

/// Folder record in the flat parent-pointer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub color: Option<String>,
}

/// Fields for folder create/update commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDraft {
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub color: Option<String>,
}

impl FolderDraft {
    pub fn new(name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            name: name.into(),
            parent_id,
            color: None,
        }
    }
}
