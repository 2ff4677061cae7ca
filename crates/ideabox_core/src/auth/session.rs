//! Session manager over the identity backend.
//!
//! # Responsibility
//! - Own the client-local session state (`user`, `is_loading`, `error`).
//! - Run identity operations against the backend and map their failures.
//! - Keep `user` in step with the backend's session-change notifications.
//!
//! # Invariants
//! - `is_loading` is reset after every operation, including panics, via
//!   a drop guard.
//! - Operations needing a user fail with `NotAuthenticated` before any
//!   backend call.
//! - Sign-in variants and account creation record failures and return
//!   normally; identity-changing operations record and return them.
//! - Observers are notified with a snapshot after the state lock is
//!   released.

use super::backend::{FederatedProvider, IdentityBackend, ListenerId, SessionListener};
use super::error::{AuthError, AuthResult};
use crate::model::identity::Identity;
use log::{error, info, warn};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Callback receiving a state snapshot after every session change.
pub type SessionObserver = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Handle returned by `SessionManager::subscribe`.
pub type ObserverId = u64;

/// Observable session snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// `None` while signed out.
    pub user: Option<Identity>,
    /// True only while an identity operation is in flight.
    pub is_loading: bool,
    /// Last recorded failure; kept until the next successful operation.
    pub error: Option<AuthError>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Message for the ambient error banner; empty when there is no error.
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

#[derive(Default)]
struct Shared {
    state: Mutex<SessionState>,
    observers: Mutex<BTreeMap<ObserverId, SessionObserver>>,
    next_observer_id: AtomicU64,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_observers(&self) -> MutexGuard<'_, BTreeMap<ObserverId, SessionObserver>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> SessionState {
        self.lock_state().clone()
    }

    fn update(&self, mutate: impl FnOnce(&mut SessionState)) {
        let snapshot = {
            let mut state = self.lock_state();
            mutate(&mut state);
            state.clone()
        };
        let observers = self.lock_observers().values().cloned().collect::<Vec<_>>();
        for observer in observers {
            observer(&snapshot);
        }
    }
}

/// Holds `is_loading` for the lifetime of one operation.
struct LoadingGuard<'a> {
    shared: &'a Shared,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(shared: &'a Shared) -> Self {
        shared.update(|state| state.is_loading = true);
        Self { shared }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.shared.update(|state| state.is_loading = false);
    }
}

/// Single authority for the current identity.
///
/// Construct once at the application root and share by reference (or
/// `Arc<SessionManager>`); every method takes `&self`.
pub struct SessionManager {
    backend: Option<Arc<dyn IdentityBackend>>,
    shared: Arc<Shared>,
    listener_id: Option<ListenerId>,
}

impl SessionManager {
    /// Creates an anonymous session bound to `backend` and subscribes to
    /// its session-change notifications.
    pub fn new(backend: Arc<dyn IdentityBackend>) -> Self {
        let shared = Arc::new(Shared::default());
        let weak = Arc::downgrade(&shared);
        let listener: SessionListener = Arc::new(move |user| {
            if let Some(shared) = weak.upgrade() {
                shared.update(|state| state.user = user);
            }
        });
        let listener_id = backend.subscribe(listener);
        info!("event=session_init module=auth status=ok backend=attached");

        Self {
            backend: Some(backend),
            shared,
            listener_id: Some(listener_id),
        }
    }

    /// Creates a session without identity backend.
    ///
    /// Every operation except `send_password_reset` fails with
    /// `BackendUnavailable`; password reset is a no-op.
    pub fn detached() -> Self {
        error!(
            "event=session_init module=auth status=error error_code=backend_unavailable backend=none"
        );
        Self {
            backend: None,
            shared: Arc::new(Shared::default()),
            listener_id: None,
        }
    }

    /// Returns a snapshot of the current session state.
    pub fn state(&self) -> SessionState {
        self.shared.snapshot()
    }

    pub fn user(&self) -> Option<Identity> {
        self.shared.lock_state().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock_state().is_loading
    }

    pub fn error(&self) -> Option<AuthError> {
        self.shared.lock_state().error.clone()
    }

    /// Registers an observer called with a snapshot after every change.
    pub fn subscribe(&self, observer: SessionObserver) -> ObserverId {
        let id = self.shared.next_observer_id.fetch_add(1, Ordering::Relaxed);
        self.shared.lock_observers().insert(id, observer);
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) {
        self.shared.lock_observers().remove(&id);
    }

    /// Drops the ambient error.
    pub fn clear_error(&self) {
        self.shared.update(|state| state.error = None);
    }

    /// Creates an account and sends its verification mail.
    ///
    /// The new user reaches the session through the backend notification.
    /// Failures are recorded into `error`; returns `None` in that case.
    pub fn create_account(&self, email: &str, password: &str) -> Option<Identity> {
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = self.backend().and_then(|backend| {
            let identity = backend.create_account(email, password)?;
            backend.send_verification(&identity)?;
            Ok(identity)
        });
        log_outcome("auth_create_account", started_at, &result);
        self.capture(result)
    }

    /// Signs in with email and password.
    ///
    /// On failure `user` is left as it was and the mapped error recorded.
    pub fn log_in(&self, email: &str, password: &str) -> Option<Identity> {
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = self.backend().and_then(|backend| {
            backend
                .sign_in_with_password(email, password)
                .map_err(AuthError::from_backend)
        });
        log_outcome("auth_log_in", started_at, &result);
        self.capture_sign_in(result)
    }

    /// Signs in through a federated provider's interactive flow.
    pub fn log_in_with_provider(&self, provider: FederatedProvider) -> Option<Identity> {
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = self.backend().and_then(|backend| {
            backend
                .sign_in_with_provider(provider)
                .map_err(AuthError::from_backend)
        });
        log_outcome("auth_log_in_federated", started_at, &result);
        self.capture_sign_in(result)
    }

    /// Signs out.
    ///
    /// A failure keeps `user`, records the backend's raw error text and
    /// returns it. Success does not clear a previously recorded error.
    pub fn log_out(&self) -> AuthResult<()> {
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = self.backend().and_then(|backend| {
            backend
                .sign_out()
                .map_err(|err| AuthError::Other(err.to_string()))
        });
        log_outcome("auth_log_out", started_at, &result);
        match result {
            Ok(()) => {
                self.shared.update(|state| state.user = None);
                Ok(())
            }
            Err(err) => Err(self.record(err)),
        }
    }

    /// Re-authenticates with `password`, then deletes the current account.
    pub fn delete_account(&self, password: &str) -> AuthResult<()> {
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = self.require_user().and_then(|(backend, user)| {
            backend.reauthenticate(&user, password)?;
            backend.delete_account(&user)?;
            Ok(())
        });
        log_outcome("auth_delete_account", started_at, &result);
        match result {
            Ok(()) => {
                self.shared.update(|state| {
                    state.user = None;
                    state.error = None;
                });
                Ok(())
            }
            Err(err) => Err(self.record(err)),
        }
    }

    /// Sends a password reset mail. No-op when no backend is attached.
    pub fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        let Some(backend) = self.backend.as_ref() else {
            warn!("event=auth_password_reset module=auth status=skipped reason=backend_unavailable");
            return Ok(());
        };
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = backend
            .send_password_reset(email)
            .map_err(AuthError::from_backend);
        log_outcome("auth_password_reset", started_at, &result);
        self.settle(result)
    }

    /// Sends a verification mail to the current user.
    pub fn send_user_verification(&self) -> AuthResult<()> {
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = self.require_user().and_then(|(backend, user)| {
            backend
                .send_verification(&user)
                .map_err(AuthError::from_backend)
        });
        log_outcome("auth_send_verification", started_at, &result);
        self.settle(result)
    }

    /// Replaces the display name and adopts the backend's returned record.
    pub fn update_display_name(&self, display_name: &str) -> AuthResult<Identity> {
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = self.require_user().and_then(|(backend, user)| {
            backend
                .update_display_name(&user, display_name)
                .map_err(AuthError::from_backend)
        });
        log_outcome("auth_update_display_name", started_at, &result);
        match result {
            Ok(identity) => {
                let adopted = identity.clone();
                self.shared.update(|state| {
                    state.user = Some(adopted);
                    state.error = None;
                });
                Ok(identity)
            }
            Err(err) => Err(self.record(err)),
        }
    }

    /// Re-authenticates, then asks the backend to verify `new_email` before
    /// switching to it. `user` keeps the old email until the backend
    /// reports the change.
    pub fn update_email(&self, new_email: &str, password: &str) -> AuthResult<()> {
        let started_at = Instant::now();
        let _loading = LoadingGuard::acquire(&self.shared);
        let result = self.require_user().and_then(|(backend, user)| {
            backend.reauthenticate(&user, password)?;
            backend.verify_before_update_email(&user, new_email)?;
            Ok(())
        });
        log_outcome("auth_update_email", started_at, &result);
        self.settle(result)
    }

    fn backend(&self) -> AuthResult<&Arc<dyn IdentityBackend>> {
        self.backend.as_ref().ok_or(AuthError::BackendUnavailable)
    }

    /// User first: without one, the answer is `NotAuthenticated` even on a
    /// detached session.
    fn require_user(&self) -> AuthResult<(&Arc<dyn IdentityBackend>, Identity)> {
        let user = self.user().ok_or(AuthError::NotAuthenticated)?;
        let backend = self.backend()?;
        Ok((backend, user))
    }

    fn record(&self, err: AuthError) -> AuthError {
        let recorded = err.clone();
        self.shared.update(|state| state.error = Some(recorded));
        err
    }

    fn settle(&self, result: AuthResult<()>) -> AuthResult<()> {
        match result {
            Ok(()) => {
                self.clear_error();
                Ok(())
            }
            Err(err) => Err(self.record(err)),
        }
    }

    fn capture(&self, result: AuthResult<Identity>) -> Option<Identity> {
        match result {
            Ok(identity) => {
                self.clear_error();
                Some(identity)
            }
            Err(err) => {
                self.record(err);
                None
            }
        }
    }

    fn capture_sign_in(&self, result: AuthResult<Identity>) -> Option<Identity> {
        match result {
            Ok(identity) => {
                let adopted = identity.clone();
                self.shared.update(|state| {
                    state.user = Some(adopted);
                    state.error = None;
                });
                Some(identity)
            }
            Err(err) => {
                self.record(err);
                None
            }
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let (Some(backend), Some(listener_id)) = (self.backend.as_ref(), self.listener_id) {
            backend.unsubscribe(listener_id);
        }
    }
}

fn log_outcome<T>(event: &str, started_at: Instant, result: &AuthResult<T>) {
    match result {
        Ok(_) => info!(
            "event={} module=auth status=ok duration_ms={}",
            event,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={} module=auth status=error duration_ms={} error_code={}",
            event,
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
}
