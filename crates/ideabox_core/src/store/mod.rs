//! Idea store contracts and implementations.
//!
//! # Responsibility
//! - Supply ordered Note and Project collections to list views.
//! - Keep SQL details behind the `IdeaStore` boundary.
//!
//! # Invariants
//! - Listing preserves insertion order.
//! - Views treat store results as read-only snapshots.

use crate::db::DbError;
use crate::model::idea::{IdeaId, Note, Project};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteIdeaStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Idea store failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound(IdeaId),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "idea not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted idea data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
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

/// Read access to the application's ideas.
pub trait IdeaStore {
    /// All notes, in insertion order.
    fn list_notes(&self) -> StoreResult<Vec<Note>>;
    /// All projects, in insertion order.
    fn list_projects(&self) -> StoreResult<Vec<Project>>;
}

/// Vector-backed store for hosts that keep ideas in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdeaStore {
    notes: Vec<Note>,
    projects: Vec<Project>,
}

impl MemoryIdeaStore {
    pub fn new(notes: Vec<Note>, projects: Vec<Project>) -> Self {
        Self { notes, projects }
    }

    pub fn push_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    pub fn push_project(&mut self, project: Project) {
        self.projects.push(project);
    }
}

impl IdeaStore for MemoryIdeaStore {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.projects.clone())
    }
}
