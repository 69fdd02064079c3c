//! SQLite-backed collaborator.
//!
//! # Responsibility
//! - Persist tags, folders, notes, habits and habit completions.
//! - Serve every collaborator command the organizer consumes.
//! - Enforce write-time integrity: unique tag names, acyclic folders, and
//!   delete guards for non-empty folders and in-use tags.
//!
//! # Invariants
//! - Ids are UUID text; timestamps are epoch milliseconds.
//! - `updated_at` strictly increases across writes made through one store.
//! - Documents reference tags through join tables, so tag renames cascade.
//! - Store failures leave the command boundary as structured errors with a
//!   stable `code`.

use crate::command::{
    CommandError, CommandResult, DocumentCommands, FolderCommands, HabitCommands, ListScope,
    TagCommands,
};
use crate::model::document::{DocumentFlag, DocumentId};
use crate::model::folder::{Folder, FolderDraft, FolderId};
use crate::model::habit::{Habit, HabitDraft, HabitId};
use crate::model::note::{Note, NoteDraft};
use crate::model::tag::{Tag, TagDraft, TagId};
use crate::validation::ValidationError;
use chrono::{NaiveDate, Utc};
use log::warn;
use rusqlite::Connection;
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use uuid::Uuid;

pub mod db;
pub mod folders;
pub mod habits;
pub mod migrations;
pub mod notes;
pub mod tags;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use folders::{FolderRepository, SqliteFolderRepository};
pub use habits::{HabitRepository, SqliteHabitRepository};
pub use notes::{NoteRepository, SqliteNoteRepository};
pub use tags::{SqliteTagRepository, TagRepository};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound { entity: &'static str, id: Uuid },
    /// Write rejected because it clashes with existing data.
    Conflict(String),
    InvalidData(String),
    Validation(ValidationError),
}

impl StoreError {
    /// Stable machine-readable code carried to the command boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(_) => "db_error",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidData(_) => "invalid_data",
            Self::Validation(_) => "validation",
        }
    }

    pub fn into_command_error(self, command: &'static str) -> CommandError {
        warn!(
            "event=store_error module=store status=error command={} code={} error={}",
            command,
            self.code(),
            self
        );
        CommandError::structured(command, self.code(), self.to_string())
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Owns one migrated connection and serves the collaborator commands.
pub struct SqliteStore {
    conn: Connection,
    last_stamp: Cell<i64>,
}

impl SqliteStore {
    /// Opens (creating if needed) and migrates a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            last_stamp: Cell::new(0),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Next write timestamp: wall clock, bumped past the previous stamp.
    fn stamp(&self) -> i64 {
        let next = Utc::now()
            .timestamp_millis()
            .max(self.last_stamp.get() + 1);
        self.last_stamp.set(next);
        next
    }

    fn notes(&self) -> SqliteNoteRepository<'_> {
        SqliteNoteRepository::new(&self.conn)
    }

    fn habits(&self) -> SqliteHabitRepository<'_> {
        SqliteHabitRepository::new(&self.conn)
    }

    fn tags(&self) -> SqliteTagRepository<'_> {
        SqliteTagRepository::new(&self.conn)
    }

    fn folders(&self) -> SqliteFolderRepository<'_> {
        SqliteFolderRepository::new(&self.conn)
    }
}

fn command<T>(name: &'static str, result: StoreResult<T>) -> CommandResult<T> {
    result.map_err(|err| err.into_command_error(name))
}

impl DocumentCommands<Note> for SqliteStore {
    fn list_documents(&self, scope: &ListScope) -> CommandResult<Vec<Note>> {
        command("list_documents", self.notes().list_notes(scope))
    }

    fn search_documents(&self, query: &str) -> CommandResult<Vec<Note>> {
        command("search_documents", self.notes().search_notes(query))
    }

    fn create_document(&self, fields: &NoteDraft) -> CommandResult<DocumentId> {
        command("create_document", self.notes().create_note(fields, self.stamp()))
    }

    fn update_document(&self, id: DocumentId, fields: &NoteDraft) -> CommandResult<()> {
        command(
            "update_document",
            self.notes().update_note(id, fields, self.stamp()),
        )
    }

    fn delete_document(&self, id: DocumentId) -> CommandResult<()> {
        command("delete_document", self.notes().delete_note(id))
    }

    fn toggle_flag(&self, id: DocumentId, flag: DocumentFlag, value: bool) -> CommandResult<()> {
        command(
            "toggle_flag",
            self.notes().set_note_flag(id, flag, value, self.stamp()),
        )
    }
}

impl DocumentCommands<Habit> for SqliteStore {
    fn list_documents(&self, _scope: &ListScope) -> CommandResult<Vec<Habit>> {
        command("list_documents", self.habits().list_habits())
    }

    fn search_documents(&self, query: &str) -> CommandResult<Vec<Habit>> {
        command("search_documents", self.habits().search_habits(query))
    }

    fn create_document(&self, fields: &HabitDraft) -> CommandResult<DocumentId> {
        command(
            "create_document",
            self.habits().create_habit(fields, self.stamp()),
        )
    }

    fn update_document(&self, id: DocumentId, fields: &HabitDraft) -> CommandResult<()> {
        command(
            "update_document",
            self.habits().update_habit(id, fields, self.stamp()),
        )
    }

    fn delete_document(&self, id: DocumentId) -> CommandResult<()> {
        command("delete_document", self.habits().delete_habit(id))
    }

    fn toggle_flag(&self, id: DocumentId, flag: DocumentFlag, value: bool) -> CommandResult<()> {
        command(
            "toggle_flag",
            self.habits().set_habit_flag(id, flag, value, self.stamp()),
        )
    }
}

impl HabitCommands for SqliteStore {
    fn complete_habit(&self, id: HabitId, date: NaiveDate) -> CommandResult<()> {
        command(
            "complete_habit",
            self.habits().complete_habit(id, date, self.stamp()),
        )
    }
}

impl TagCommands for SqliteStore {
    fn list_tags(&self) -> CommandResult<Vec<Tag>> {
        command("list_tags", self.tags().list_tags())
    }

    fn create_tag(&self, fields: &TagDraft) -> CommandResult<TagId> {
        command("create_tag", self.tags().create_tag(fields, self.stamp()))
    }

    fn update_tag(&self, id: TagId, fields: &TagDraft) -> CommandResult<()> {
        command("update_tag", self.tags().update_tag(id, fields))
    }

    fn delete_tag(&self, id: TagId) -> CommandResult<()> {
        command("delete_tag", self.tags().delete_tag(id))
    }
}

impl FolderCommands for SqliteStore {
    fn list_folders(&self) -> CommandResult<Vec<Folder>> {
        command("list_folders", self.folders().list_folders())
    }

    fn create_folder(&self, fields: &FolderDraft) -> CommandResult<FolderId> {
        command(
            "create_folder",
            self.folders().create_folder(fields, self.stamp()),
        )
    }

    fn update_folder(&self, id: FolderId, fields: &FolderDraft) -> CommandResult<()> {
        command(
            "update_folder",
            self.folders().update_folder(id, fields, self.stamp()),
        )
    }

    fn delete_folder(&self, id: FolderId) -> CommandResult<()> {
        command("delete_folder", self.folders().delete_folder(id))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>, column: &str) -> StoreResult<Option<Uuid>> {
    value.map(|value| parse_uuid(&value, column)).transpose()
}
