//! Identity backend adapter contract.
//!
//! # Responsibility
//! - Define the operations core needs from an external identity provider.
//! - Carry provider failures as raw codes until `AuthError` maps them.
//!
//! # Invariants
//! - Implementations must be callable from any thread (`Send + Sync`).
//! - Session-change listeners are invoked without internal locks held.
//! - Every fallible call is single-attempt; retries are the caller's job.

use crate::model::identity::Identity;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type BackendResult<T> = Result<T, BackendError>;

/// Callback fired whenever the backend's signed-in identity changes.
pub type SessionListener = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// Handle returned by `IdentityBackend::subscribe`.
pub type ListenerId = u64;

/// Failure reported by an identity backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Provider rejected the call with a stable code such as
    /// `auth/invalid-credential`.
    Provider { code: String, message: String },
    /// Call never produced a provider answer (network, SDK, configuration).
    Transport(String),
}

impl BackendError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Provider code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Provider { code, .. } => Some(code.as_str()),
            Self::Transport(_) => None,
        }
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider { code, message } => write!(f, "{message} ({code})"),
            Self::Transport(message) => write!(f, "{message}"),
        }
    }
}

impl Error for BackendError {}

/// Federated sign-in providers supported by the account surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FederatedProvider {
    Google,
}

impl FederatedProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

/// Operations core requires from the identity provider.
///
/// Methods taking `user` act on that identity, which must be the one the
/// backend currently considers signed in.
pub trait IdentityBackend: Send + Sync {
    /// Creates an account and signs it in.
    fn create_account(&self, email: &str, password: &str) -> BackendResult<Identity>;

    fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Identity>;

    /// Runs the provider's interactive (popup) flow.
    fn sign_in_with_provider(&self, provider: FederatedProvider) -> BackendResult<Identity>;

    fn sign_out(&self) -> BackendResult<()>;

    /// Registers a session-change listener. The listener is not invoked
    /// with the current state on registration.
    fn subscribe(&self, listener: SessionListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);

    /// Confirms the user's password again before a sensitive change.
    fn reauthenticate(&self, user: &Identity, password: &str) -> BackendResult<()>;

    fn delete_account(&self, user: &Identity) -> BackendResult<()>;

    fn send_password_reset(&self, email: &str) -> BackendResult<()>;

    fn send_verification(&self, user: &Identity) -> BackendResult<()>;

    /// Returns the updated identity record.
    fn update_display_name(&self, user: &Identity, display_name: &str) -> BackendResult<Identity>;

    /// Sends a verification mail to `new_email`; the address changes only
    /// once the user follows the link.
    fn verify_before_update_email(&self, user: &Identity, new_email: &str) -> BackendResult<()>;
}
