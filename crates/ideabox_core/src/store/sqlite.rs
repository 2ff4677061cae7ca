//! SQLite-backed idea store.
//!
//! # Responsibility
//! - Persist notes and projects with their archive/trash flags.
//! - Return them in insertion order.
//!
//! # Invariants
//! - Flag columns hold only 0 or 1; anything else is reported as
//!   `InvalidData` instead of being coerced.
//! - Flag updates on unknown ids fail with `NotFound`.

use super::{IdeaStore, StoreError, StoreResult};
use crate::model::idea::{IdeaId, IdeaKind, Note, Project};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT id, title, content, is_archived, is_trash
FROM notes
ORDER BY position ASC";

const PROJECT_SELECT_SQL: &str = "SELECT id, title, description, is_archived, is_trash
FROM projects
ORDER BY position ASC";

/// Idea store over a migrated SQLite connection.
pub struct SqliteIdeaStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdeaStore<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert_note(&self, note: &Note) -> StoreResult<IdeaId> {
        self.conn.execute(
            "INSERT INTO notes (id, position, title, content, is_archived, is_trash)
             VALUES (?1, (SELECT COALESCE(MAX(position), -1) + 1 FROM notes), ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.is_archived,
                note.is_trash,
            ],
        )?;
        Ok(note.id)
    }

    pub fn insert_project(&self, project: &Project) -> StoreResult<IdeaId> {
        self.conn.execute(
            "INSERT INTO projects (id, position, title, description, is_archived, is_trash)
             VALUES (?1, (SELECT COALESCE(MAX(position), -1) + 1 FROM projects), ?2, ?3, ?4, ?5);",
            params![
                project.id.to_string(),
                project.title.as_str(),
                project.description.as_str(),
                project.is_archived,
                project.is_trash,
            ],
        )?;
        Ok(project.id)
    }

    /// Sets or clears the archive flag of one idea.
    pub fn set_archived(&self, kind: IdeaKind, id: IdeaId, archived: bool) -> StoreResult<()> {
        self.update_flag(kind, "is_archived", id, archived)
    }

    /// Moves one idea to (or out of) the trash.
    pub fn set_trashed(&self, kind: IdeaKind, id: IdeaId, trashed: bool) -> StoreResult<()> {
        self.update_flag(kind, "is_trash", id, trashed)
    }

    fn update_flag(
        &self,
        kind: IdeaKind,
        column: &'static str,
        id: IdeaId,
        value: bool,
    ) -> StoreResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET {column} = ?1, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?2;",
                table_name(kind)
            ),
            params![value, id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

impl IdeaStore for SqliteIdeaStore<'_> {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(NOTE_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let (is_archived, is_trash) = parse_flags(row, "notes")?;
            notes.push(Note {
                id: parse_id(row, "notes")?,
                title: row.get("title")?,
                content: row.get("content")?,
                is_archived,
                is_trash,
            });
        }
        Ok(notes)
    }

    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(PROJECT_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            let (is_archived, is_trash) = parse_flags(row, "projects")?;
            projects.push(Project {
                id: parse_id(row, "projects")?,
                title: row.get("title")?,
                description: row.get("description")?,
                is_archived,
                is_trash,
            });
        }
        Ok(projects)
    }
}

fn table_name(kind: IdeaKind) -> &'static str {
    match kind {
        IdeaKind::Note => "notes",
        IdeaKind::Project => "projects",
    }
}

fn parse_id(row: &Row<'_>, table: &str) -> StoreResult<IdeaId> {
    let text: String = row.get("id")?;
    Uuid::parse_str(&text)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{text}` in {table}.id")))
}

fn parse_flags(row: &Row<'_>, table: &str) -> StoreResult<(bool, bool)> {
    Ok((
        parse_flag(row, table, "is_archived")?,
        parse_flag(row, table, "is_trash")?,
    ))
}

fn parse_flag(row: &Row<'_>, table: &str, column: &str) -> StoreResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid {column} value `{other}` in {table}.{column}"
        ))),
    }
}
