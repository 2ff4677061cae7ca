//! Signed-in identity record.
//!
//! # Responsibility
//! - Mirror the profile fields the identity backend exposes.
//!
//! # Invariants
//! - Records are owned by the backend; core replaces them wholesale with
//!   whatever the backend returns and never edits fields in place.

use serde::{Deserialize, Serialize};

/// Backend-assigned user identifier (opaque string, e.g. a provider uid).
pub type IdentityId = String;

/// Identity record as reported by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    /// `None` until the user sets one. Empty names are normalized to `None`.
    pub display_name: Option<String>,
    pub email_verified: bool,
}

impl Identity {
    /// Creates an unverified identity without display name.
    pub fn new(id: impl Into<IdentityId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            email_verified: false,
        }
    }

    /// Returns a copy carrying `display_name`; blank input clears the name.
    pub fn with_display_name(mut self, display_name: &str) -> Self {
        let trimmed = display_name.trim();
        self.display_name = if trimmed.is_empty() {
            None
        } else {
            Some(display_name.to_string())
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Identity;

    #[test]
    fn blank_display_name_clears_value() {
        let identity = Identity::new("uid-1", "a@example.com").with_display_name("Ada");
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));

        let cleared = identity.with_display_name("   ");
        assert_eq!(cleared.display_name, None);
    }
}
