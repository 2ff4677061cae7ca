//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `ideabox_core` linkage.
//! - Start file logging when `IDEABOX_LOG_DIR` is set.
//! - Walk one scripted account session against the in-memory identity
//!   backend and print each step.
//! - Keep output deterministic for quick local sanity checks.

use ideabox_core::{
    archived_ideas, AccountDialog, CoreConfig, MemoryIdentityBackend, Note, Project, ScreenKind,
    SessionManager, DELETE_CONFIRMATION_PHRASE,
};
use std::sync::Arc;

const DEMO_EMAIL: &str = "demo@ideabox.local";
const DEMO_PASSWORD: &str = "demo-password";

fn main() {
    println!("ideabox_core ping={}", ideabox_core::ping());
    println!("ideabox_core version={}", ideabox_core::core_version());

    match CoreConfig::from_env().init_logging() {
        Ok(true) => println!("logging status=on"),
        Ok(false) => println!("logging status=off"),
        Err(err) => println!("logging status=error message=\"{err}\""),
    }

    run_session_demo();
    run_archive_demo();
}

fn run_session_demo() {
    let backend = Arc::new(MemoryIdentityBackend::new());
    let session = SessionManager::new(backend.clone());

    let created = session.create_account(DEMO_EMAIL, DEMO_PASSWORD).is_some();
    println!("session create_account ok={created} mail_sent={}", backend.sent_mail().len());

    let mut dialog = AccountDialog::new(ScreenKind::DisplayName);
    dialog.open(ScreenKind::DisplayName);
    dialog.set_new_display_name("Demo");
    print_submit(&mut dialog, &session);

    dialog.open(ScreenKind::Email);
    dialog.set_email(DEMO_EMAIL);
    dialog.set_password(DEMO_PASSWORD);
    print_submit(&mut dialog, &session);

    dialog.open(ScreenKind::Delete);
    dialog.set_delete_confirmation(DELETE_CONFIRMATION_PHRASE);
    dialog.set_password(DEMO_PASSWORD);
    print_submit(&mut dialog, &session);

    println!(
        "session signed_in={} backend_calls={}",
        session.user().is_some(),
        backend.calls()
    );
}

fn print_submit(dialog: &mut AccountDialog, session: &SessionManager) {
    let screen = dialog.screen().as_str();
    match dialog.submit(session) {
        Ok(outcome) => println!(
            "dialog screen={screen} status=ok info=\"{}\" redirect_home={}",
            outcome.info, outcome.redirect_home
        ),
        Err(err) => println!("dialog screen={screen} status=error message=\"{err}\""),
    }
}

fn run_archive_demo() {
    let notes = [
        Note::new("kept", "visible"),
        Note::new("archived note", "hidden from main list").archived(),
        Note::new("trashed note", "gone").archived().trashed(),
    ];
    let projects = [Project::new("archived project", "paused").archived()];
    let archive = archived_ideas(&notes, &projects);
    println!("archive items={}", archive.len());
    for idea in archive {
        println!("archive kind={:?} title={}", idea.kind(), idea.title());
    }
}
