//! Tag table and document/tag links.
//!
//! # Invariants
//! - Tag names are unique and case-preserving.
//! - A tag still linked to any note or habit cannot be deleted.
//! - Link rows keep the document's tag order through `position`.

use super::{parse_uuid, StoreError, StoreResult};
use crate::model::tag::{Tag, TagDraft, TagId};
use crate::validation::{check_color, require_name};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

/// Repository interface for tag metadata.
pub trait TagRepository {
    fn list_tags(&self) -> StoreResult<Vec<Tag>>;
    /// Creates a tag; an existing tag with the same name is returned as is.
    fn create_tag(&self, draft: &TagDraft, now_ms: i64) -> StoreResult<TagId>;
    fn update_tag(&self, id: TagId, draft: &TagDraft) -> StoreResult<()>;
    fn delete_tag(&self, id: TagId) -> StoreResult<()>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM tags ORDER BY name COLLATE NOCASE ASC, name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("id")?;
            tags.push(Tag {
                id: parse_uuid(&id, "tags.id")?,
                name: row.get("name")?,
                color: row.get("color")?,
            });
        }
        Ok(tags)
    }

    fn create_tag(&self, draft: &TagDraft, now_ms: i64) -> StoreResult<TagId> {
        let name = require_name(&draft.name, "tag name")?;
        check_color(draft.color.as_deref())?;

        if let Some(existing) = find_tag_id(self.conn, &name)? {
            return Ok(existing);
        }
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tags (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4);",
            params![id.to_string(), name, draft.color, now_ms],
        )?;
        Ok(id)
    }

    fn update_tag(&self, id: TagId, draft: &TagDraft) -> StoreResult<()> {
        let name = require_name(&draft.name, "tag name")?;
        check_color(draft.color.as_deref())?;

        if let Some(owner) = find_tag_id(self.conn, &name)? {
            if owner != id {
                return Err(StoreError::Conflict(format!(
                    "a tag named `{name}` already exists"
                )));
            }
        }
        let changed = self.conn.execute(
            "UPDATE tags SET name = ?2, color = ?3 WHERE id = ?1;",
            params![id.to_string(), name, draft.color],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "tag", id });
        }
        Ok(())
    }

    fn delete_tag(&self, id: TagId) -> StoreResult<()> {
        let id_text = id.to_string();
        let usage: i64 = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM note_tags WHERE tag_id = ?1)
              + (SELECT COUNT(*) FROM habit_tags WHERE tag_id = ?1);",
            [id_text.as_str()],
            |row| row.get(0),
        )?;
        if usage > 0 {
            return Err(StoreError::Conflict(format!(
                "tag is still used by {usage} document(s)"
            )));
        }
        let changed = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "tag", id });
        }
        Ok(())
    }
}

/// Join table linking one document kind to tags.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TagLinks {
    Notes,
    Habits,
}

impl TagLinks {
    fn table(self) -> &'static str {
        match self {
            Self::Notes => "note_tags",
            Self::Habits => "habit_tags",
        }
    }

    fn owner_column(self) -> &'static str {
        match self {
            Self::Notes => "note_id",
            Self::Habits => "habit_id",
        }
    }

    /// Replaces the owner's tag links, creating missing tags on the fly.
    pub(crate) fn replace(
        self,
        conn: &Connection,
        owner_id: &str,
        names: &[String],
        now_ms: i64,
    ) -> StoreResult<()> {
        conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1;", self.table(), self.owner_column()),
            [owner_id],
        )?;
        for (position, name) in names.iter().enumerate() {
            let tag_id = match find_tag_id(conn, name)? {
                Some(tag_id) => tag_id,
                None => {
                    let tag_id = Uuid::new_v4();
                    conn.execute(
                        "INSERT INTO tags (id, name, color, created_at) VALUES (?1, ?2, NULL, ?3);",
                        params![tag_id.to_string(), name, now_ms],
                    )?;
                    tag_id
                }
            };
            conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO {} ({}, tag_id, position) VALUES (?1, ?2, ?3);",
                    self.table(),
                    self.owner_column()
                ),
                params![owner_id, tag_id.to_string(), position as i64],
            )?;
        }
        Ok(())
    }

    /// Loads the owner's tag names in link order.
    pub(crate) fn load(self, conn: &Connection, owner_id: &str) -> StoreResult<Vec<String>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT t.name
             FROM {} l
             INNER JOIN tags t ON t.id = l.tag_id
             WHERE l.{} = ?1
             ORDER BY l.position ASC;",
            self.table(),
            self.owner_column()
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get(0)?);
        }
        Ok(names)
    }
}

fn find_tag_id(conn: &Connection, name: &str) -> StoreResult<Option<TagId>> {
    let id: Option<String> = conn
        .query_row("SELECT id FROM tags WHERE name = ?1;", [name], |row| row.get(0))
        .optional()?;
    id.map(|id| parse_uuid(&id, "tags.id")).transpose()
}
