//! Account session and identity operations.
//!
//! # Responsibility
//! - Define the adapter contract to the external identity backend.
//! - Map backend failures into a closed, user-facing error taxonomy.
//! - Own the observable session state and its lifecycle.
//!
//! # Invariants
//! - Provider-specific error codes never leave this module unmapped.
//! - Exactly one `SessionManager` is created per running client.

pub mod backend;
pub mod error;
pub mod memory;
pub mod session;
