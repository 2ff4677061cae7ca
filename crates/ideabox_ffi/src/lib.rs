//! Flutter bridge surface for Ideabox core.
//!
//! Generated bindings live on the Dart side; this crate only declares the
//! callable API.

pub mod api;
