//! Idea archive view.
//!
//! # Responsibility
//! - Select archived, non-trashed notes and projects.
//! - Produce the view model the archive page renders.
//!
//! # Invariants
//! - Notes come before projects; each keeps its source order.
//! - The view never mutates ideas.

use crate::model::idea::{Idea, Note, Project};
use crate::store::{IdeaStore, StoreResult};
use log::debug;

/// Placeholder shown when nothing is archived.
pub const EMPTY_ARCHIVE_PLACEHOLDER: &str = "Archive is empty";

/// Whether an idea belongs in the archive.
pub fn is_archive_visible(is_archived: bool, is_trash: bool) -> bool {
    is_archived && !is_trash
}

/// Archived, non-trashed ideas: notes first, then projects.
pub fn archived_ideas(notes: &[Note], projects: &[Project]) -> Vec<Idea> {
    let archived_notes = notes
        .iter()
        .filter(|note| is_archive_visible(note.is_archived, note.is_trash))
        .cloned()
        .map(Idea::from);
    let archived_projects = projects
        .iter()
        .filter(|project| is_archive_visible(project.is_archived, project.is_trash))
        .cloned()
        .map(Idea::from);
    archived_notes.chain(archived_projects).collect()
}

/// Rendered archive page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveView {
    /// Nothing archived; render `EMPTY_ARCHIVE_PLACEHOLDER`.
    Empty,
    Ideas(Vec<Idea>),
}

impl ArchiveView {
    pub fn from_collections(notes: &[Note], projects: &[Project]) -> Self {
        let ideas = archived_ideas(notes, projects);
        if ideas.is_empty() {
            Self::Empty
        } else {
            Self::Ideas(ideas)
        }
    }

    pub fn ideas(&self) -> &[Idea] {
        match self {
            Self::Empty => &[],
            Self::Ideas(ideas) => ideas,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Placeholder text for the empty state, `None` when there are ideas.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Empty => Some(EMPTY_ARCHIVE_PLACEHOLDER),
            Self::Ideas(_) => None,
        }
    }
}

/// Builds archive views from an idea store.
pub struct ArchiveService<S: IdeaStore> {
    store: S,
}

impl<S: IdeaStore> ArchiveService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the store and renders the current archive.
    pub fn view(&self) -> StoreResult<ArchiveView> {
        let notes = self.store.list_notes()?;
        let projects = self.store.list_projects()?;
        let view = ArchiveView::from_collections(&notes, &projects);
        debug!(
            "event=archive_view module=archive status=ok items={}",
            view.ideas().len()
        );
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::{archived_ideas, ArchiveView, EMPTY_ARCHIVE_PLACEHOLDER};
    use crate::model::idea::{Idea, Note, Project};

    #[test]
    fn keeps_only_archived_untrashed_ideas() {
        let kept = Note::new("kept", "").archived();
        let notes = vec![kept.clone(), Note::new("trashed", "").archived().trashed()];
        let projects = vec![Project::new("active", "")];

        let ideas = archived_ideas(&notes, &projects);
        assert_eq!(ideas, vec![Idea::Note(kept)]);
    }

    #[test]
    fn notes_precede_projects_in_source_order() {
        let first = Project::new("p1", "").archived();
        let second = Project::new("p2", "").archived();
        let note = Note::new("n1", "").archived();

        let ideas = archived_ideas(&[note.clone()], &[first.clone(), second.clone()]);
        let ids = ideas.iter().map(Idea::id).collect::<Vec<_>>();
        assert_eq!(ids, vec![note.id, first.id, second.id]);
    }

    #[test]
    fn empty_archive_renders_placeholder() {
        let view = ArchiveView::from_collections(&[Note::new("draft", "")], &[]);
        assert!(view.is_empty());
        assert_eq!(view.placeholder(), Some(EMPTY_ARCHIVE_PLACEHOLDER));
        assert!(view.ideas().is_empty());
    }
}
