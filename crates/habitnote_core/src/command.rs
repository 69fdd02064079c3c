//! Command interface of the external collaborator.
//!
//! # Responsibility
//! - Define the request/response operations the organizer consumes.
//! - Carry collaborator failures as opaque, recoverable payloads.
//!
//! # Invariants
//! - Every mutation returns only an id or unit; callers reload to observe
//!   the authoritative state.
//! - Failures are never fatal to the organizer.

use crate::model::document::{Document, DocumentFlag, DocumentId};
use crate::model::folder::{Folder, FolderDraft, FolderId};
use crate::model::habit::HabitId;
use crate::model::tag::{Tag, TagDraft, TagId};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for collaborator commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// Failure payload returned by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    Text(String),
    Structured { code: String, message: String },
}

/// One failed collaborator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    /// Command name, e.g. `list_documents`.
    pub command: &'static str,
    pub payload: ErrorPayload,
}

impl CommandError {
    pub fn text(command: &'static str, message: impl Into<String>) -> Self {
        Self {
            command,
            payload: ErrorPayload::Text(message.into()),
        }
    }

    pub fn structured(
        command: &'static str,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            command,
            payload: ErrorPayload::Structured {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    /// Human-readable message without the command prefix.
    pub fn message(&self) -> &str {
        match &self.payload {
            ErrorPayload::Text(message) => message,
            ErrorPayload::Structured { message, .. } => message,
        }
    }

    /// Structured error code, if the collaborator sent one.
    pub fn code(&self) -> Option<&str> {
        match &self.payload {
            ErrorPayload::Text(_) => None,
            ErrorPayload::Structured { code, .. } => Some(code),
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.payload {
            ErrorPayload::Text(message) => write!(f, "{} failed: {message}", self.command),
            ErrorPayload::Structured { code, message } => {
                write!(f, "{} failed [{code}]: {message}", self.command)
            }
        }
    }
}

impl Error for CommandError {}

/// Which documents a list command returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListScope {
    /// Every document of the kind.
    #[default]
    All,
    /// Notes filed in one of the listed folders. Ignored for habits.
    Folders(Vec<FolderId>),
}

/// Document commands for one document kind.
pub trait DocumentCommands<D: Document> {
    fn list_documents(&self, scope: &ListScope) -> CommandResult<Vec<D>>;
    fn search_documents(&self, query: &str) -> CommandResult<Vec<D>>;
    fn create_document(&self, fields: &D::Draft) -> CommandResult<DocumentId>;
    fn update_document(&self, id: DocumentId, fields: &D::Draft) -> CommandResult<()>;
    fn delete_document(&self, id: DocumentId) -> CommandResult<()>;
    fn toggle_flag(&self, id: DocumentId, flag: DocumentFlag, value: bool) -> CommandResult<()>;
}

/// Habit progress commands.
pub trait HabitCommands {
    /// Marks the habit done on `date`; repeating a day is a no-op.
    fn complete_habit(&self, id: HabitId, date: NaiveDate) -> CommandResult<()>;
}

/// Tag metadata commands.
pub trait TagCommands {
    fn list_tags(&self) -> CommandResult<Vec<Tag>>;
    fn create_tag(&self, fields: &TagDraft) -> CommandResult<TagId>;
    fn update_tag(&self, id: TagId, fields: &TagDraft) -> CommandResult<()>;
    fn delete_tag(&self, id: TagId) -> CommandResult<()>;
}

/// Folder commands.
pub trait FolderCommands {
    fn list_folders(&self) -> CommandResult<Vec<Folder>>;
    fn create_folder(&self, fields: &FolderDraft) -> CommandResult<FolderId>;
    fn update_folder(&self, id: FolderId, fields: &FolderDraft) -> CommandResult<()>;
    fn delete_folder(&self, id: FolderId) -> CommandResult<()>;
}

/// Full collaborator surface used by the organizer.
pub trait Collaborator:
    DocumentCommands<crate::model::note::Note>
    + DocumentCommands<crate::model::habit::Habit>
    + HabitCommands
    + TagCommands
    + FolderCommands
{
}

impl<T> Collaborator for T where
    T: DocumentCommands<crate::model::note::Note>
        + DocumentCommands<crate::model::habit::Habit>
        + HabitCommands
        + TagCommands
        + FolderCommands
{
}
