//! Note persistence.
//!
//! # Responsibility
//! - Store notes with their folder placement, flags and tag links.
//! - Answer scoped listings and substring searches.
//!
//! # Invariants
//! - Blank titles are stored as "Untitled note".
//! - Tag links are replaced as a whole in the same transaction as the row.
//! - Every write, including flag toggles, moves `updated_at` forward.

use super::folders::ensure_folder_exists;
use super::tags::TagLinks;
use super::{parse_optional_uuid, parse_uuid, StoreError, StoreResult};
use crate::command::ListScope;
use crate::model::document::DocumentFlag;
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::ordering::fold_case;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const NOTE_COLUMNS: &str =
    "id, title, content, folder_id, is_pinned, is_archived, color, created_at, updated_at";

/// Repository interface for notes.
pub trait NoteRepository {
    fn list_notes(&self, scope: &ListScope) -> StoreResult<Vec<Note>>;
    /// Case-insensitive substring match on title or content.
    fn search_notes(&self, query: &str) -> StoreResult<Vec<Note>>;
    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>>;
    fn create_note(&self, draft: &NoteDraft, now_ms: i64) -> StoreResult<NoteId>;
    /// Replaces every editable field, tags included.
    fn update_note(&self, id: NoteId, draft: &NoteDraft, now_ms: i64) -> StoreResult<()>;
    fn delete_note(&self, id: NoteId) -> StoreResult<()>;
    fn set_note_flag(
        &self,
        id: NoteId,
        flag: DocumentFlag,
        value: bool,
        now_ms: i64,
    ) -> StoreResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_notes(&self, filter: &str, bind_values: Vec<Value>) -> StoreResult<Vec<Note>> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes {filter} ORDER BY is_pinned DESC, updated_at DESC, rowid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(note_from_row(self.conn, row)?);
        }
        Ok(notes)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn list_notes(&self, scope: &ListScope) -> StoreResult<Vec<Note>> {
        match scope {
            ListScope::All => self.query_notes("", Vec::new()),
            ListScope::Folders(ids) if ids.is_empty() => Ok(Vec::new()),
            ListScope::Folders(ids) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                let bind_values = ids
                    .iter()
                    .map(|id| Value::Text(id.to_string()))
                    .collect();
                self.query_notes(
                    &format!("WHERE folder_id IN ({placeholders})"),
                    bind_values,
                )
            }
        }
    }

    fn search_notes(&self, query: &str) -> StoreResult<Vec<Note>> {
        self.query_notes(
            "WHERE instr(fold_case(title), ?1) > 0 OR instr(fold_case(content), ?1) > 0",
            vec![Value::Text(search_needle(query))],
        )
    }

    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let mut notes = self.query_notes("WHERE id = ?1", vec![Value::Text(id.to_string())])?;
        Ok(notes.pop())
    }

    fn create_note(&self, draft: &NoteDraft, now_ms: i64) -> StoreResult<NoteId> {
        let draft = draft.normalized()?;
        let id = Uuid::new_v4();
        let id_text = id.to_string();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(folder_id) = draft.folder_id {
            ensure_folder_exists(&tx, folder_id)?;
        }
        tx.execute(
            "INSERT INTO notes (
                id, title, content, folder_id, is_pinned, is_archived, color, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
            params![
                id_text,
                draft.title,
                draft.content,
                draft.folder_id.map(|folder| folder.to_string()),
                draft.is_pinned,
                draft.is_archived,
                draft.color,
                now_ms,
            ],
        )?;
        TagLinks::Notes.replace(&tx, &id_text, &draft.tags, now_ms)?;
        tx.commit()?;
        Ok(id)
    }

    fn update_note(&self, id: NoteId, draft: &NoteDraft, now_ms: i64) -> StoreResult<()> {
        let draft = draft.normalized()?;
        let id_text = id.to_string();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(folder_id) = draft.folder_id {
            ensure_folder_exists(&tx, folder_id)?;
        }
        let changed = tx.execute(
            "UPDATE notes
             SET title = ?2,
                 content = ?3,
                 folder_id = ?4,
                 is_pinned = ?5,
                 is_archived = ?6,
                 color = ?7,
                 updated_at = ?8
             WHERE id = ?1;",
            params![
                id_text,
                draft.title,
                draft.content,
                draft.folder_id.map(|folder| folder.to_string()),
                draft.is_pinned,
                draft.is_archived,
                draft.color,
                now_ms,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "note", id });
        }
        TagLinks::Notes.replace(&tx, &id_text, &draft.tags, now_ms)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "note", id });
        }
        Ok(())
    }

    fn set_note_flag(
        &self,
        id: NoteId,
        flag: DocumentFlag,
        value: bool,
        now_ms: i64,
    ) -> StoreResult<()> {
        let column = match flag {
            DocumentFlag::Pinned => "is_pinned",
            DocumentFlag::Archived => "is_archived",
            DocumentFlag::Active => {
                return Err(StoreError::InvalidData(
                    "notes have no `active` flag".to_string(),
                ))
            }
        };
        let changed = self.conn.execute(
            &format!("UPDATE notes SET {column} = ?2, updated_at = ?3 WHERE id = ?1;"),
            params![id.to_string(), value, now_ms],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "note", id });
        }
        Ok(())
    }
}

/// Folded query text for `instr(fold_case(column), ?)` matching.
///
/// `instr` matches literally, so `%` and `_` need no escaping.
pub(crate) fn search_needle(query: &str) -> String {
    fold_case(query.trim())
}

fn note_from_row(conn: &Connection, row: &Row<'_>) -> StoreResult<Note> {
    let id_text: String = row.get("id")?;
    let tags = TagLinks::Notes.load(conn, &id_text)?;
    Ok(Note {
        id: parse_uuid(&id_text, "notes.id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        folder_id: parse_optional_uuid(row.get("folder_id")?, "notes.folder_id")?,
        tags,
        is_pinned: row.get("is_pinned")?,
        is_archived: row.get("is_archived")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

