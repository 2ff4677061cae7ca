//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose archive listing, idea entry and account-dialog helpers to Dart
//!   via FRB.
//! - Flatten core types into plain strings, options and envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in envelopes, never as panics.

use ideabox_core::db::open_db;
use ideabox_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    submit_enabled, ArchiveService, CoreConfig, Idea, IdeaId, IdeaKind, Identity, Note, Project,
    ScreenKind, ScreenLayout, SqliteIdeaStore, StoreResult, SubmitInputs,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Initializes logging from `IDEABOX_LOG_LEVEL` and `IDEABOX_LOG_DIR`.
///
/// # FFI contract
/// - Leaves logging off when `IDEABOX_LOG_DIR` is unset.
/// - Returns empty string on success (or when logging stays off) and error
///   message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging_from_env() -> String {
    match CoreConfig::from_env().init_logging() {
        Ok(_) => String::new(),
        Err(err) => err,
    }
}

/// One archived idea, flattened for Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveItem {
    pub idea_id: String,
    /// `note|project`.
    pub kind: String,
    pub title: String,
    pub body: String,
}

/// Archive page envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResponse {
    pub items: Vec<ArchiveItem>,
    /// Text to show instead of items; `None` when items exist or on error.
    pub placeholder: Option<String>,
    /// Empty on success, diagnostic text on failure.
    pub message: String,
}

/// Generic action envelope for idea entry calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    pub ok: bool,
    pub idea_id: Option<String>,
    pub message: String,
}

impl EntryActionResponse {
    fn success(message: impl Into<String>, idea_id: IdeaId) -> Self {
        Self {
            ok: true,
            idea_id: Some(idea_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            idea_id: None,
            message: message.into(),
        }
    }
}

/// Presentation data for one account dialog screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountScreenResponse {
    pub ok: bool,
    pub title: String,
    pub header_lines: Vec<String>,
    /// Field labels in display order.
    pub fields: Vec<String>,
    pub submit_label: String,
    pub can_remove_display_name: bool,
    pub message: String,
}

/// Lists the archive from the configured database.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures land in `message`.
#[flutter_rust_bridge::frb(sync)]
pub fn archive_list() -> ArchiveResponse {
    match with_store(|store| ArchiveService::new(store).view()) {
        Ok(view) => ArchiveResponse {
            items: view.ideas().iter().map(to_archive_item).collect(),
            placeholder: view.placeholder().map(str::to_string),
            message: String::new(),
        },
        Err(err) => ArchiveResponse {
            items: Vec::new(),
            placeholder: None,
            message: format!("archive_list failed: {err}"),
        },
    }
}

/// Creates a note in the configured database.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_create_note(title: String, content: String) -> EntryActionResponse {
    let note = Note::new(title.trim(), content);
    match with_store(|store| store.insert_note(&note)) {
        Ok(id) => EntryActionResponse::success("Note created.", id),
        Err(err) => EntryActionResponse::failure(format!("entry_create_note failed: {err}")),
    }
}

/// Creates a project in the configured database.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_create_project(title: String, description: String) -> EntryActionResponse {
    let project = Project::new(title.trim(), description);
    match with_store(|store| store.insert_project(&project)) {
        Ok(id) => EntryActionResponse::success("Project created.", id),
        Err(err) => EntryActionResponse::failure(format!("entry_create_project failed: {err}")),
    }
}

/// Archives or unarchives one idea.
///
/// `kind` is `note|project`; `idea_id` is the UUID string from a previous
/// response.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_set_archived(kind: String, idea_id: String, archived: bool) -> EntryActionResponse {
    let (kind, id) = match parse_target(&kind, &idea_id) {
        Ok(target) => target,
        Err(message) => return EntryActionResponse::failure(message),
    };
    match with_store(|store| store.set_archived(kind, id, archived)) {
        Ok(()) => EntryActionResponse::success("Archive flag updated.", id),
        Err(err) => EntryActionResponse::failure(format!("entry_set_archived failed: {err}")),
    }
}

/// Moves one idea to or out of the trash.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_set_trashed(kind: String, idea_id: String, trashed: bool) -> EntryActionResponse {
    let (kind, id) = match parse_target(&kind, &idea_id) {
        Ok(target) => target,
        Err(message) => return EntryActionResponse::failure(message),
    };
    match with_store(|store| store.set_trashed(kind, id, trashed)) {
        Ok(()) => EntryActionResponse::success("Trash flag updated.", id),
        Err(err) => EntryActionResponse::failure(format!("entry_set_trashed failed: {err}")),
    }
}

/// Describes an account dialog screen for the signed-in user.
///
/// # FFI contract
/// - Pure computation, UI-thread safe.
/// - Unknown `screen` values return `ok=false` with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn account_screen_layout(
    screen: String,
    user_email: Option<String>,
    user_display_name: Option<String>,
) -> AccountScreenResponse {
    let Some(screen) = ScreenKind::parse(&screen) else {
        warn!("event=account_screen_layout module=ffi status=error error_code=unknown_screen");
        return AccountScreenResponse {
            ok: false,
            title: String::new(),
            header_lines: Vec::new(),
            fields: Vec::new(),
            submit_label: String::new(),
            can_remove_display_name: false,
            message: format!("unknown account screen `{}`", screen.trim()),
        };
    };
    let user = to_identity(user_email, user_display_name);
    let layout = ScreenLayout::new(screen, user.as_ref());
    AccountScreenResponse {
        ok: true,
        title: layout.title.to_string(),
        header_lines: layout.header_lines,
        fields: layout
            .fields
            .iter()
            .map(|field| field.label().to_string())
            .collect(),
        submit_label: layout.submit_label.to_string(),
        can_remove_display_name: layout.can_remove_display_name,
        message: String::new(),
    }
}

/// Evaluates the submit-button rule for an account dialog screen.
///
/// Returns `false` for unknown screens.
#[flutter_rust_bridge::frb(sync)]
pub fn account_can_submit(
    screen: String,
    user_email: Option<String>,
    email: String,
    password: String,
    delete_confirmation: String,
    new_display_name: String,
) -> bool {
    let Some(screen) = ScreenKind::parse(&screen) else {
        return false;
    };
    let user = to_identity(user_email, None);
    submit_enabled(
        screen,
        user.as_ref(),
        &SubmitInputs {
            email: &email,
            password: &password,
            delete_confirmation: &delete_confirmation,
            new_display_name: &new_display_name,
        },
    )
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

fn with_store<T>(f: impl FnOnce(SqliteIdeaStore<'_>) -> StoreResult<T>) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("idea DB open failed: {err}"))?;
    f(SqliteIdeaStore::new(&conn)).map_err(|err| err.to_string())
}

fn parse_target(kind: &str, idea_id: &str) -> Result<(IdeaKind, IdeaId), String> {
    let kind = match kind.trim().to_ascii_lowercase().as_str() {
        "note" => IdeaKind::Note,
        "project" => IdeaKind::Project,
        other => return Err(format!("unknown idea kind `{other}`; expected note|project")),
    };
    let id = IdeaId::parse_str(idea_id.trim())
        .map_err(|_| format!("invalid idea id `{}`", idea_id.trim()))?;
    Ok((kind, id))
}

fn to_identity(email: Option<String>, display_name: Option<String>) -> Option<Identity> {
    let identity = Identity::new(String::new(), email?);
    Some(match display_name {
        Some(name) => identity.with_display_name(&name),
        None => identity,
    })
}

fn to_archive_item(idea: &Idea) -> ArchiveItem {
    ArchiveItem {
        idea_id: idea.id().to_string(),
        kind: idea_kind_label(idea.kind()).to_string(),
        title: idea.title().to_string(),
        body: idea.body().to_string(),
    }
}

fn idea_kind_label(kind: IdeaKind) -> &'static str {
    match kind {
        IdeaKind::Note => "note",
        IdeaKind::Project => "project",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        account_can_submit, account_screen_layout, archive_list, core_version, entry_create_note,
        entry_create_project, entry_set_archived, entry_set_trashed, init_logging, ping, DB_PATH,
    };
    use std::sync::OnceLock;

    /// Pins the process DB path to a fresh temp directory.
    fn use_temp_db() {
        static DIR: OnceLock<tempfile::TempDir> = OnceLock::new();
        let dir = DIR.get_or_init(|| tempfile::tempdir().expect("temp dir"));
        let path = dir.path().join("ideabox.sqlite3");
        assert_eq!(DB_PATH.get_or_init(|| path.clone()), &path);
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn archived_entries_show_up_in_archive_list() {
        use_temp_db();
        let empty = archive_list();
        assert!(empty.message.is_empty(), "{}", empty.message);
        assert!(empty.items.is_empty());
        assert_eq!(empty.placeholder.as_deref(), Some("Archive is empty"));

        let note = entry_create_note("ffi note".to_string(), "body".to_string());
        assert!(note.ok, "{}", note.message);
        let note_id = note.idea_id.expect("note id");
        let project = entry_create_project("ffi project".to_string(), "desc".to_string());
        assert!(project.ok, "{}", project.message);
        let project_id = project.idea_id.expect("project id");

        let archived = entry_set_archived("note".to_string(), note_id.clone(), true);
        assert!(archived.ok, "{}", archived.message);
        let archived = entry_set_archived("project".to_string(), project_id.clone(), true);
        assert!(archived.ok, "{}", archived.message);
        let trashed = entry_set_trashed("project".to_string(), project_id.clone(), true);
        assert!(trashed.ok, "{}", trashed.message);

        let listing = archive_list();
        assert!(listing.message.is_empty(), "{}", listing.message);
        assert!(listing
            .items
            .iter()
            .any(|item| item.idea_id == note_id && item.kind == "note"));
        assert!(!listing.items.iter().any(|item| item.idea_id == project_id));
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.placeholder, None);
    }

    #[test]
    fn entry_flags_reject_bad_targets() {
        let response = entry_set_archived("task".to_string(), "x".to_string(), true);
        assert!(!response.ok);
        assert!(response.message.contains("note|project"));

        let response = entry_set_trashed("note".to_string(), "not-a-uuid".to_string(), true);
        assert!(!response.ok);
        assert!(response.message.contains("invalid idea id"));
    }

    #[test]
    fn account_layout_and_enablement() {
        let layout = account_screen_layout(
            "delete".to_string(),
            Some("ada@example.com".to_string()),
            None,
        );
        assert!(layout.ok);
        assert_eq!(layout.title, "Delete account");
        assert_eq!(layout.fields, vec!["delete-my-account", "Password"]);

        let unknown = account_screen_layout("deleteAccount".to_string(), None, None);
        assert!(!unknown.ok);

        assert!(account_can_submit(
            "display_name".to_string(),
            None,
            String::new(),
            String::new(),
            String::new(),
            "AB".to_string(),
        ));
        assert!(!account_can_submit(
            "password".to_string(),
            Some("ada@example.com".to_string()),
            "bob@example.com".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ));
    }
}
