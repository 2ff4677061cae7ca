//! Account dialog screens and their presentation data.
//!
//! # Responsibility
//! - Enumerate the account operations the dialog can host.
//! - Describe per-screen title, header lines, inputs and submit label.
//!
//! # Invariants
//! - Every screen is handled by exhaustive matches; there is no fallback
//!   screen.
//! - The password input appears only on screens that re-authenticate.

use crate::model::identity::Identity;
use serde::{Deserialize, Serialize};

/// Literal the user must type to confirm account deletion.
pub const DELETE_CONFIRMATION_PHRASE: &str = "delete-my-account";

/// Account operation hosted by the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    /// Change the sign-in email (re-authenticates).
    Email,
    /// Send a password reset link.
    Password,
    /// Delete the account (re-authenticates).
    Delete,
    DisplayName,
    /// Resend the email verification link.
    Verification,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 5] = [
        ScreenKind::Email,
        ScreenKind::Password,
        ScreenKind::Delete,
        ScreenKind::DisplayName,
        ScreenKind::Verification,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Delete => "delete",
            Self::DisplayName => "display_name",
            Self::Verification => "verification",
        }
    }

    /// Parses the snake_case label produced by `as_str`.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|screen| screen.as_str() == normalized)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Email => "Update email",
            Self::Password => "Reset password",
            Self::Delete => "Delete account",
            Self::DisplayName => "Update display name",
            Self::Verification => "Email verification",
        }
    }

    /// Header text shown under the title for `user`.
    pub fn header_lines(self, user: Option<&Identity>) -> Vec<String> {
        let email = user.map(|user| user.email.as_str()).unwrap_or_default();
        match self {
            Self::Email => {
                let mut lines = Vec::new();
                if !email.is_empty() {
                    lines.push(email.to_string());
                }
                lines.push("To continue, type your new email and your password below".to_string());
                lines
            }
            Self::Password => vec![
                format!("Password reset link will be sent to {email}"),
                "To continue, type your email below".to_string(),
            ],
            Self::Delete => vec![
                format!(
                    "We will delete your account and all data associated with the email '{email}'"
                ),
                format!(
                    "To continue, type '{DELETE_CONFIRMATION_PHRASE}' and your password below"
                ),
            ],
            Self::DisplayName => {
                let mut lines = Vec::new();
                if let Some(name) = user.and_then(|user| user.display_name.as_deref()) {
                    lines.push(name.to_string());
                }
                lines.push("To continue, type your new display name below".to_string());
                lines
            }
            Self::Verification => vec![
                format!("Email verification link will be sent to '{email}'"),
                "To continue, type your email below".to_string(),
            ],
        }
    }

    /// Inputs shown on this screen, in display order.
    pub fn fields(self) -> &'static [DialogField] {
        match self {
            Self::Email => &[DialogField::NewEmail, DialogField::Password],
            Self::Password => &[DialogField::Email],
            Self::Delete => &[DialogField::DeleteConfirmation, DialogField::Password],
            Self::DisplayName => &[DialogField::NewDisplayName],
            Self::Verification => &[DialogField::Email],
        }
    }

    pub fn shows_password(self) -> bool {
        self.fields().contains(&DialogField::Password)
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            Self::Password => "Send",
            Self::Verification => "Resend",
            Self::Email | Self::Delete | Self::DisplayName => "Submit",
        }
    }
}

/// Input control of the account dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogField {
    NewEmail,
    /// Current email, typed again as confirmation.
    Email,
    DeleteConfirmation,
    NewDisplayName,
    Password,
}

impl DialogField {
    pub fn label(self) -> &'static str {
        match self {
            Self::NewEmail => "New email",
            Self::Email => "Email",
            Self::DeleteConfirmation => DELETE_CONFIRMATION_PHRASE,
            Self::NewDisplayName => "New display name",
            Self::Password => "Password",
        }
    }
}

/// Everything a host UI needs to draw one screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenLayout {
    pub screen: ScreenKind,
    pub title: &'static str,
    pub header_lines: Vec<String>,
    pub fields: Vec<DialogField>,
    pub submit_label: &'static str,
    /// "Remove display name" action, offered only when a name is set.
    pub can_remove_display_name: bool,
}

impl ScreenLayout {
    pub fn new(screen: ScreenKind, user: Option<&Identity>) -> Self {
        Self {
            screen,
            title: screen.title(),
            header_lines: screen.header_lines(user),
            fields: screen.fields().to_vec(),
            submit_label: screen.submit_label(),
            can_remove_display_name: screen == ScreenKind::DisplayName
                && user.is_some_and(|user| user.display_name.is_some()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DialogField, ScreenKind, ScreenLayout};
    use crate::model::identity::Identity;

    #[test]
    fn parse_accepts_labels_and_rejects_unknown_screens() {
        for screen in ScreenKind::ALL {
            assert_eq!(ScreenKind::parse(screen.as_str()), Some(screen));
        }
        assert_eq!(ScreenKind::parse(" Display_Name "), Some(ScreenKind::DisplayName));
        assert_eq!(ScreenKind::parse("deleteAccount"), None);
    }

    #[test]
    fn password_input_only_on_reauthenticating_screens() {
        let with_password = ScreenKind::ALL
            .into_iter()
            .filter(|screen| screen.shows_password())
            .collect::<Vec<_>>();
        assert_eq!(with_password, vec![ScreenKind::Email, ScreenKind::Delete]);
    }

    #[test]
    fn layout_mentions_current_user() {
        let user = Identity::new("uid-1", "ada@example.com").with_display_name("Ada");

        let delete = ScreenLayout::new(ScreenKind::Delete, Some(&user));
        assert!(delete.header_lines[0].contains("'ada@example.com'"));
        assert_eq!(
            delete.fields,
            vec![DialogField::DeleteConfirmation, DialogField::Password]
        );

        let rename = ScreenLayout::new(ScreenKind::DisplayName, Some(&user));
        assert_eq!(rename.header_lines[0], "Ada");
        assert!(rename.can_remove_display_name);

        let verify = ScreenLayout::new(ScreenKind::Verification, None);
        assert_eq!(verify.submit_label, "Resend");
        assert!(!verify.can_remove_display_name);
    }
}
