//! Account dialog form model.
//!
//! # Responsibility
//! - Hold the dialog's local inputs for the selected screen.
//! - Decide when submission is enabled.
//! - Validate locally, then run the matching session operation.
//!
//! # Invariants
//! - Local validation failures never reach the identity backend.
//! - A successful submission clears every input and closes the dialog.
//! - A failed submission keeps the dialog open with its inputs intact.

use super::screen::{ScreenKind, ScreenLayout, DELETE_CONFIRMATION_PHRASE};
use crate::auth::error::AuthError;
use crate::auth::session::{SessionManager, SessionState};
use crate::model::identity::Identity;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const EMAIL_UNCHANGED: &str = "Email is the same as current email";
pub const EMAIL_MISMATCH: &str = "Email is not the same as current email";
pub const DISPLAY_NAME_UNCHANGED: &str = "Display name is the same as current display name";

pub const INFO_VERIFY_NEW_EMAIL: &str = "Please verify your new email address";
pub const INFO_PASSWORD_RESET_SENT: &str = "Password reset link sent to your email";
pub const INFO_ACCOUNT_DELETED: &str = "Account deleted successfully";
pub const INFO_DISPLAY_NAME_UPDATED: &str = "Display name updated successfully";
pub const INFO_DISPLAY_NAME_REMOVED: &str = "Display name removed successfully";
pub const INFO_VERIFICATION_SENT: &str = "Verification link sent to your email";

/// Field-level validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.email.is_none() && self.password.is_none()
    }

    fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        [&self.display_name, &self.email, &self.password]
            .into_iter()
            .filter_map(|message| message.as_deref())
    }
}

/// Reason a dialog action did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// Dialog is closed.
    NotOpen,
    /// Enablement rule for the current screen is not met.
    SubmitDisabled(ScreenKind),
    /// Local validation rejected the input before any backend call.
    Validation(&'static str),
    /// Session operation failed; the session state carries the same error.
    Session(AuthError),
}

impl Display for DialogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "account dialog is not open"),
            Self::SubmitDisabled(screen) => {
                write!(f, "submit is disabled for screen `{}`", screen.as_str())
            }
            Self::Validation(message) => write!(f, "{message}"),
            Self::Session(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DialogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AuthError> for DialogError {
    fn from(value: AuthError) -> Self {
        Self::Session(value)
    }
}

/// Result of a completed dialog action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogOutcome {
    /// Info banner text for the application shell.
    pub info: &'static str,
    /// Host should navigate to the landing page (account is gone).
    pub redirect_home: bool,
}

impl DialogOutcome {
    fn info(info: &'static str) -> Self {
        Self {
            info,
            redirect_home: false,
        }
    }
}

/// Form state of the account dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDialog {
    screen: ScreenKind,
    is_open: bool,
    email: String,
    password: String,
    delete_confirmation: String,
    new_display_name: String,
    show_password: bool,
    errors: FieldErrors,
}

impl AccountDialog {
    /// Creates a closed dialog preset to `screen`.
    pub fn new(screen: ScreenKind) -> Self {
        Self {
            screen,
            is_open: false,
            email: String::new(),
            password: String::new(),
            delete_confirmation: String::new(),
            new_display_name: String::new(),
            show_password: false,
            errors: FieldErrors::default(),
        }
    }

    /// Opens the dialog on `screen` with empty inputs.
    pub fn open(&mut self, screen: ScreenKind) {
        *self = Self::new(screen);
        self.is_open = true;
    }

    /// Clears every input and closes the dialog.
    pub fn cancel(&mut self) {
        let screen = self.screen;
        *self = Self::new(screen);
    }

    pub fn screen(&self) -> ScreenKind {
        self.screen
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn delete_confirmation(&self) -> &str {
        &self.delete_confirmation
    }

    pub fn new_display_name(&self) -> &str {
        &self.new_display_name
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Email input; holds the new email on `Email`, the current one otherwise.
    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.password = value.into();
    }

    pub fn set_delete_confirmation(&mut self, value: impl Into<String>) {
        self.delete_confirmation = value.into();
    }

    pub fn set_new_display_name(&mut self, value: impl Into<String>) {
        self.new_display_name = value.into();
    }

    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    pub fn is_password_visible(&self) -> bool {
        self.show_password
    }

    pub fn layout(&self, user: Option<&Identity>) -> ScreenLayout {
        ScreenLayout::new(self.screen, user)
    }

    /// Whether the submit button is enabled for the current inputs.
    pub fn can_submit(&self, user: Option<&Identity>) -> bool {
        submit_enabled(
            self.screen,
            user,
            &SubmitInputs {
                email: &self.email,
                password: &self.password,
                delete_confirmation: &self.delete_confirmation,
                new_display_name: &self.new_display_name,
            },
        )
    }

    /// Messages for the dialog footer: field errors, then the ambient
    /// session error.
    pub fn messages(&self, state: &SessionState) -> Vec<String> {
        let mut messages = self
            .errors
            .messages()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if let Some(err) = state.error.as_ref() {
            messages.push(err.to_string());
        }
        messages
    }

    /// Validates the inputs and runs the current screen's operation.
    pub fn submit(&mut self, session: &SessionManager) -> Result<DialogOutcome, DialogError> {
        if !self.is_open {
            return Err(DialogError::NotOpen);
        }
        self.errors = FieldErrors::default();
        let user = session.user();
        if !self.can_submit(user.as_ref()) {
            return Err(DialogError::SubmitDisabled(self.screen));
        }
        debug!(
            "event=account_dialog_submit module=account status=start screen={}",
            self.screen.as_str()
        );

        let result = self.run(session, user.as_ref());
        match &result {
            Ok(_) => {
                info!(
                    "event=account_dialog_submit module=account status=ok screen={}",
                    self.screen.as_str()
                );
                self.cancel();
            }
            Err(err) => warn!(
                "event=account_dialog_submit module=account status=error screen={} error={}",
                self.screen.as_str(),
                dialog_error_code(err)
            ),
        }
        result
    }

    /// Clears the display name through the session. Offered on the
    /// `DisplayName` screen when a name is set.
    pub fn remove_display_name(
        &mut self,
        session: &SessionManager,
    ) -> Result<DialogOutcome, DialogError> {
        if !self.is_open {
            return Err(DialogError::NotOpen);
        }
        let user = session.user();
        if !self.layout(user.as_ref()).can_remove_display_name {
            return Err(DialogError::SubmitDisabled(self.screen));
        }
        session.update_display_name("")?;
        info!("event=account_dialog_remove_display_name module=account status=ok");
        self.cancel();
        Ok(DialogOutcome::info(INFO_DISPLAY_NAME_REMOVED))
    }

    fn run(
        &mut self,
        session: &SessionManager,
        user: Option<&Identity>,
    ) -> Result<DialogOutcome, DialogError> {
        let current_email = user.map(|user| user.email.as_str());
        match self.screen {
            ScreenKind::Email => {
                if current_email == Some(self.email.as_str()) {
                    return Err(self.reject_email(EMAIL_UNCHANGED));
                }
                session.update_email(&self.email, &self.password)?;
                Ok(DialogOutcome::info(INFO_VERIFY_NEW_EMAIL))
            }
            ScreenKind::Password => {
                let email = current_email.ok_or(AuthError::NotAuthenticated)?;
                session.send_password_reset(email)?;
                Ok(DialogOutcome::info(INFO_PASSWORD_RESET_SENT))
            }
            ScreenKind::Delete => {
                session.delete_account(&self.password)?;
                Ok(DialogOutcome {
                    info: INFO_ACCOUNT_DELETED,
                    redirect_home: true,
                })
            }
            ScreenKind::DisplayName => {
                let current_name = user.and_then(|user| user.display_name.as_deref());
                if current_name == Some(self.new_display_name.as_str()) {
                    self.errors.display_name = Some(DISPLAY_NAME_UNCHANGED.to_string());
                    return Err(DialogError::Validation(DISPLAY_NAME_UNCHANGED));
                }
                session.update_display_name(&self.new_display_name)?;
                Ok(DialogOutcome::info(INFO_DISPLAY_NAME_UPDATED))
            }
            ScreenKind::Verification => {
                if current_email != Some(self.email.as_str()) {
                    return Err(self.reject_email(EMAIL_MISMATCH));
                }
                session.send_user_verification()?;
                Ok(DialogOutcome::info(INFO_VERIFICATION_SENT))
            }
        }
    }

    fn reject_email(&mut self, message: &'static str) -> DialogError {
        self.errors.email = Some(message.to_string());
        DialogError::Validation(message)
    }
}

/// Borrowed dialog inputs for enablement checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitInputs<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub delete_confirmation: &'a str,
    pub new_display_name: &'a str,
}

/// Enablement rule per screen.
///
/// Display-name length is counted in Unicode scalar values (`char`s), so a
/// single emoji counts as one character.
pub fn submit_enabled(screen: ScreenKind, user: Option<&Identity>, inputs: &SubmitInputs<'_>) -> bool {
    match screen {
        ScreenKind::Email => !inputs.email.trim().is_empty() && !inputs.password.trim().is_empty(),
        ScreenKind::Password => user.is_some_and(|user| user.email == inputs.email),
        ScreenKind::Delete => {
            inputs.delete_confirmation == DELETE_CONFIRMATION_PHRASE
                && !inputs.password.trim().is_empty()
        }
        ScreenKind::DisplayName => {
            !inputs.new_display_name.trim().is_empty() && inputs.new_display_name.chars().count() > 1
        }
        ScreenKind::Verification => !inputs.email.trim().is_empty(),
    }
}

fn dialog_error_code(err: &DialogError) -> &'static str {
    match err {
        DialogError::NotOpen => "not_open",
        DialogError::SubmitDisabled(_) => "submit_disabled",
        DialogError::Validation(_) => "validation",
        DialogError::Session(err) => err.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::{submit_enabled, SubmitInputs};
    use crate::account::screen::ScreenKind;
    use crate::model::identity::Identity;

    #[test]
    fn display_name_needs_more_than_one_char() {
        let one = SubmitInputs {
            new_display_name: "A",
            ..SubmitInputs::default()
        };
        let two = SubmitInputs {
            new_display_name: "AB",
            ..SubmitInputs::default()
        };
        let blank = SubmitInputs {
            new_display_name: "   ",
            ..SubmitInputs::default()
        };
        assert!(!submit_enabled(ScreenKind::DisplayName, None, &one));
        assert!(submit_enabled(ScreenKind::DisplayName, None, &two));
        assert!(!submit_enabled(ScreenKind::DisplayName, None, &blank));

        let one_emoji = SubmitInputs {
            new_display_name: "\u{1F600}",
            ..SubmitInputs::default()
        };
        let two_emoji = SubmitInputs {
            new_display_name: "\u{1F600}\u{1F680}",
            ..SubmitInputs::default()
        };
        assert!(!submit_enabled(ScreenKind::DisplayName, None, &one_emoji));
        assert!(submit_enabled(ScreenKind::DisplayName, None, &two_emoji));
    }

    #[test]
    fn password_screen_requires_matching_current_email() {
        let user = Identity::new("uid-1", "ada@example.com");
        let matching = SubmitInputs {
            email: "ada@example.com",
            ..SubmitInputs::default()
        };
        let other = SubmitInputs {
            email: "bob@example.com",
            ..SubmitInputs::default()
        };
        assert!(submit_enabled(ScreenKind::Password, Some(&user), &matching));
        assert!(!submit_enabled(ScreenKind::Password, Some(&user), &other));
        assert!(!submit_enabled(ScreenKind::Password, None, &matching));
    }

    #[test]
    fn delete_requires_exact_phrase_and_password() {
        let ok = SubmitInputs {
            delete_confirmation: "delete-my-account",
            password: "secret-1",
            ..SubmitInputs::default()
        };
        let wrong_phrase = SubmitInputs {
            delete_confirmation: "delete my account",
            password: "secret-1",
            ..SubmitInputs::default()
        };
        let no_password = SubmitInputs {
            delete_confirmation: "delete-my-account",
            password: " ",
            ..SubmitInputs::default()
        };
        assert!(submit_enabled(ScreenKind::Delete, None, &ok));
        assert!(!submit_enabled(ScreenKind::Delete, None, &wrong_phrase));
        assert!(!submit_enabled(ScreenKind::Delete, None, &no_password));
    }

    #[test]
    fn email_and_verification_need_non_blank_inputs() {
        let email_only = SubmitInputs {
            email: "new@example.com",
            ..SubmitInputs::default()
        };
        assert!(!submit_enabled(ScreenKind::Email, None, &email_only));
        assert!(submit_enabled(ScreenKind::Verification, None, &email_only));

        let both = SubmitInputs {
            email: "new@example.com",
            password: "secret-1",
            ..SubmitInputs::default()
        };
        assert!(submit_enabled(ScreenKind::Email, None, &both));
    }
}
