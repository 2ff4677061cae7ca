//! Core logic for Ideabox.
//! Account session, account dialog and idea archive live here; UI hosts
//! bind to these types instead of talking to the identity backend directly.

pub mod account;
pub mod archive;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod store;

pub use account::dialog::{
    submit_enabled, AccountDialog, DialogError, DialogOutcome, FieldErrors, SubmitInputs,
};
pub use account::screen::{DialogField, ScreenKind, ScreenLayout, DELETE_CONFIRMATION_PHRASE};
pub use archive::{archived_ideas, ArchiveService, ArchiveView, EMPTY_ARCHIVE_PLACEHOLDER};
pub use auth::backend::{
    BackendError, BackendResult, FederatedProvider, IdentityBackend, ListenerId, SessionListener,
};
pub use auth::error::{AuthError, AuthResult};
pub use auth::memory::{BackendOp, MailKind, MemoryIdentityBackend, SentMail};
pub use auth::session::{ObserverId, SessionManager, SessionObserver, SessionState};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::idea::{Idea, IdeaId, IdeaKind, Note, Project};
pub use model::identity::{Identity, IdentityId};
pub use store::{IdeaStore, MemoryIdeaStore, SqliteIdeaStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
