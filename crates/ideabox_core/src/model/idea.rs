//! Note and Project domain models.
//!
//! # Responsibility
//! - Define the two idea kinds shown by list views.
//! - Provide the shared `Idea` view over both kinds.
//!
//! # Invariants
//! - `id` is stable and never reused for another idea.
//! - `is_trash` wins over `is_archived`: trashed ideas never count as archived.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier shared by notes and projects.
pub type IdeaId = Uuid;

/// Discriminates the two idea kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaKind {
    Note,
    Project,
}

/// Free-form note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: IdeaId,
    pub title: String,
    pub content: String,
    pub is_archived: bool,
    pub is_trash: bool,
}

impl Note {
    /// Creates an active (not archived, not trashed) note with a fresh ID.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            is_archived: false,
            is_trash: false,
        }
    }

    pub fn archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    pub fn trashed(mut self) -> Self {
        self.is_trash = true;
        self
    }
}

/// Project with a short description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: IdeaId,
    pub title: String,
    pub description: String,
    pub is_archived: bool,
    pub is_trash: bool,
}

impl Project {
    /// Creates an active (not archived, not trashed) project with a fresh ID.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            is_archived: false,
            is_trash: false,
        }
    }

    pub fn archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    pub fn trashed(mut self) -> Self {
        self.is_trash = true;
        self
    }
}

/// Either idea kind, rendered identically by list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Idea {
    Note(Note),
    Project(Project),
}

impl Idea {
    pub fn id(&self) -> IdeaId {
        match self {
            Self::Note(note) => note.id,
            Self::Project(project) => project.id,
        }
    }

    pub fn kind(&self) -> IdeaKind {
        match self {
            Self::Note(_) => IdeaKind::Note,
            Self::Project(_) => IdeaKind::Project,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Note(note) => note.title.as_str(),
            Self::Project(project) => project.title.as_str(),
        }
    }

    /// Note content or project description.
    pub fn body(&self) -> &str {
        match self {
            Self::Note(note) => note.content.as_str(),
            Self::Project(project) => project.description.as_str(),
        }
    }

    pub fn is_archived(&self) -> bool {
        match self {
            Self::Note(note) => note.is_archived,
            Self::Project(project) => project.is_archived,
        }
    }

    pub fn is_trash(&self) -> bool {
        match self {
            Self::Note(note) => note.is_trash,
            Self::Project(project) => project.is_trash,
        }
    }
}

impl From<Note> for Idea {
    fn from(value: Note) -> Self {
        Self::Note(value)
    }
}

impl From<Project> for Idea {
    fn from(value: Project) -> Self {
        Self::Project(value)
    }
}
