//! Domain models shared by session, dialog and list views.
//!
//! # Responsibility
//! - Define the identity record mirrored from the identity backend.
//! - Define the Note/Project idea kinds shown by list views.
//!
//! # Invariants
//! - Every idea is identified by a stable `IdeaId`.
//! - Identity records are never mutated field-by-field by core.

pub mod idea;
pub mod identity;
