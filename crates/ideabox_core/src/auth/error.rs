//! User-facing authentication error taxonomy.
//!
//! # Responsibility
//! - Map provider-specific backend codes into a closed set of kinds.
//! - Own the stable messages shown by account surfaces.
//!
//! # Invariants
//! - Nothing outside this module matches on provider code strings.
//! - Unknown provider codes keep the raw code for diagnostics.

use super::backend::BackendError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthResult<T> = Result<T, AuthError>;

pub const CODE_INVALID_CREDENTIAL: &str = "auth/invalid-credential";
pub const CODE_EMAIL_IN_USE: &str = "auth/email-already-in-use";
pub const CODE_INVALID_EMAIL: &str = "auth/invalid-email";
pub const CODE_OPERATION_NOT_ALLOWED: &str = "auth/operation-not-allowed";
pub const CODE_WEAK_PASSWORD: &str = "auth/weak-password";
pub const CODE_TOO_MANY_REQUESTS: &str = "auth/too-many-requests";

/// Authentication failure as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    EmailInUse,
    InvalidEmail,
    OperationNotAllowed,
    WeakPassword,
    /// Provider throttled the account after repeated failures.
    RateLimited,
    /// Operation needs a signed-in user and there is none.
    NotAuthenticated,
    /// No identity backend is attached to the session.
    BackendUnavailable,
    /// Provider code without a dedicated kind.
    Unmapped { code: String },
    /// Non-provider failure, kept as text.
    Other(String),
}

impl AuthError {
    /// Maps a backend failure onto the closed taxonomy.
    pub fn from_backend(error: BackendError) -> Self {
        match error {
            BackendError::Provider { code, .. } => match code.as_str() {
                CODE_INVALID_CREDENTIAL => Self::InvalidCredentials,
                CODE_EMAIL_IN_USE => Self::EmailInUse,
                CODE_INVALID_EMAIL => Self::InvalidEmail,
                CODE_OPERATION_NOT_ALLOWED => Self::OperationNotAllowed,
                CODE_WEAK_PASSWORD => Self::WeakPassword,
                CODE_TOO_MANY_REQUESTS => Self::RateLimited,
                _ => Self::Unmapped { code },
            },
            BackendError::Transport(message) => Self::Other(message),
        }
    }

    /// Stable snake_case label for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailInUse => "email_in_use",
            Self::InvalidEmail => "invalid_email",
            Self::OperationNotAllowed => "operation_not_allowed",
            Self::WeakPassword => "weak_password",
            Self::RateLimited => "rate_limited",
            Self::NotAuthenticated => "not_authenticated",
            Self::BackendUnavailable => "backend_unavailable",
            Self::Unmapped { .. } => "unmapped",
            Self::Other(_) => "other",
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid credentials provided"),
            Self::EmailInUse => write!(f, "Email already in use"),
            Self::InvalidEmail => write!(f, "Invalid email address"),
            Self::OperationNotAllowed => write!(f, "Operation not allowed"),
            Self::WeakPassword => write!(f, "The password is too weak"),
            Self::RateLimited => {
                write!(f, "Access temporarily disabled due to many failed attempts")
            }
            Self::NotAuthenticated => write!(f, "User not found."),
            Self::BackendUnavailable => write!(f, "Identity backend is not initialized"),
            Self::Unmapped { code } => {
                write!(f, "Unknown identity backend error, code: {code}")
            }
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for AuthError {}

impl From<BackendError> for AuthError {
    fn from(value: BackendError) -> Self {
        Self::from_backend(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthError, CODE_INVALID_CREDENTIAL, CODE_TOO_MANY_REQUESTS};
    use crate::auth::backend::BackendError;

    #[test]
    fn maps_known_provider_codes() {
        let mapped = AuthError::from_backend(BackendError::provider(
            CODE_INVALID_CREDENTIAL,
            "bad password",
        ));
        assert_eq!(mapped, AuthError::InvalidCredentials);
        assert_eq!(mapped.to_string(), "Invalid credentials provided");

        let throttled =
            AuthError::from_backend(BackendError::provider(CODE_TOO_MANY_REQUESTS, "slow down"));
        assert_eq!(
            throttled.to_string(),
            "Access temporarily disabled due to many failed attempts"
        );
    }

    #[test]
    fn unknown_code_keeps_raw_code() {
        let mapped =
            AuthError::from_backend(BackendError::provider("auth/popup-blocked", "blocked"));
        assert_eq!(
            mapped,
            AuthError::Unmapped {
                code: "auth/popup-blocked".to_string()
            }
        );
        assert!(mapped.to_string().ends_with("auth/popup-blocked"));
    }

    #[test]
    fn transport_failure_is_stringified_as_is() {
        let mapped = AuthError::from(BackendError::transport("network unreachable"));
        assert_eq!(mapped, AuthError::Other("network unreachable".to_string()));
        assert_eq!(mapped.to_string(), "network unreachable");
    }
}
