//! Account dialog: per-operation forms over the session manager.
//!
//! # Responsibility
//! - Describe the five account screens and their inputs.
//! - Gate, validate and submit account operations.
//!
//! # See also
//! - `crate::auth::session` for the operations each screen runs.

pub mod dialog;
pub mod screen;
