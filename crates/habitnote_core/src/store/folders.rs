//! Folder persistence.
//!
//! # Invariants
//! - Listing order is creation order, which the tree keeps for siblings.
//! - A parent must exist, and re-parenting never creates a cycle.
//! - A folder holding notes or subfolders cannot be deleted.

use super::{parse_optional_uuid, parse_uuid, StoreError, StoreResult};
use crate::model::folder::{Folder, FolderDraft, FolderId};
use crate::validation::{check_color, check_folder_parent, require_name};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Repository interface for folders.
pub trait FolderRepository {
    fn list_folders(&self) -> StoreResult<Vec<Folder>>;
    fn create_folder(&self, draft: &FolderDraft, now_ms: i64) -> StoreResult<FolderId>;
    /// Renames, recolors or re-parents a folder.
    fn update_folder(&self, id: FolderId, draft: &FolderDraft, now_ms: i64) -> StoreResult<()>;
    fn delete_folder(&self, id: FolderId) -> StoreResult<()>;
}

/// SQLite-backed folder repository.
pub struct SqliteFolderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FolderRepository for SqliteFolderRepository<'_> {
    fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        load_folders(self.conn)
    }

    fn create_folder(&self, draft: &FolderDraft, now_ms: i64) -> StoreResult<FolderId> {
        let name = require_name(&draft.name, "folder name")?;
        check_color(draft.color.as_deref())?;
        if let Some(parent_id) = draft.parent_id {
            ensure_folder_exists(self.conn, parent_id)?;
        }

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO folders (id, name, parent_id, color, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                id.to_string(),
                name,
                draft.parent_id.map(|parent| parent.to_string()),
                draft.color,
                now_ms,
            ],
        )?;
        Ok(id)
    }

    fn update_folder(&self, id: FolderId, draft: &FolderDraft, now_ms: i64) -> StoreResult<()> {
        let name = require_name(&draft.name, "folder name")?;
        check_color(draft.color.as_deref())?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_folder_exists(&tx, id)?;
        if let Some(parent_id) = draft.parent_id {
            ensure_folder_exists(&tx, parent_id)?;
            check_folder_parent(&load_folders(&tx)?, id, Some(parent_id))?;
        }
        tx.execute(
            "UPDATE folders
             SET name = ?2, parent_id = ?3, color = ?4, updated_at = ?5
             WHERE id = ?1;",
            params![
                id.to_string(),
                name,
                draft.parent_id.map(|parent| parent.to_string()),
                draft.color,
                now_ms,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_folder(&self, id: FolderId) -> StoreResult<()> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_folder_exists(&tx, id)?;

        let (subfolders, notes): (i64, i64) = tx.query_row(
            "SELECT
                (SELECT COUNT(*) FROM folders WHERE parent_id = ?1),
                (SELECT COUNT(*) FROM notes WHERE folder_id = ?1);",
            [id_text.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        if subfolders > 0 || notes > 0 {
            return Err(StoreError::Conflict(format!(
                "folder is not empty: {subfolders} subfolder(s), {notes} note(s)"
            )));
        }

        tx.execute("DELETE FROM folders WHERE id = ?1;", [id_text.as_str()])?;
        tx.commit()?;
        Ok(())
    }
}

fn load_folders(conn: &Connection) -> StoreResult<Vec<Folder>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, parent_id, color
         FROM folders
         ORDER BY created_at ASC, rowid ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut folders = Vec::new();
    while let Some(row) = rows.next()? {
        let id: String = row.get("id")?;
        folders.push(Folder {
            id: parse_uuid(&id, "folders.id")?,
            name: row.get("name")?,
            parent_id: parse_optional_uuid(row.get("parent_id")?, "folders.parent_id")?,
            color: row.get("color")?,
        });
    }
    Ok(folders)
}

pub(crate) fn ensure_folder_exists(conn: &Connection, id: FolderId) -> StoreResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(StoreError::NotFound {
            entity: "folder",
            id,
        })
    }
}
