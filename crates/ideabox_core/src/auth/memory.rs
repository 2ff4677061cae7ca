//! In-process identity backend.
//!
//! # Responsibility
//! - Provide a deterministic `IdentityBackend` for local runs and tests.
//! - Apply the provider rules account surfaces depend on (weak password,
//!   malformed email, duplicate email, throttling after failed sign-ins).
//! - Record outgoing mails instead of sending them.
//!
//! # Invariants
//! - Emails are unique across accounts, compared trimmed and ASCII
//!   case-insensitively.
//! - Listeners are invoked after the internal lock is released.
//! - Injected failures are consumed by the first matching call.

use super::backend::{
    BackendError, BackendResult, FederatedProvider, IdentityBackend, ListenerId, SessionListener,
};
use super::error::{
    CODE_EMAIL_IN_USE, CODE_INVALID_CREDENTIAL, CODE_INVALID_EMAIL, CODE_TOO_MANY_REQUESTS,
    CODE_WEAK_PASSWORD,
};
use crate::model::identity::{Identity, IdentityId};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Minimum password length accepted on account creation.
pub const MIN_PASSWORD_CHARS: usize = 6;
/// Failed sign-ins per email before the account is throttled.
pub const MAX_FAILED_SIGN_INS: u32 = 5;

const CODE_POPUP_CLOSED: &str = "auth/popup-closed-by-user";
const CODE_USER_NOT_FOUND: &str = "auth/user-not-found";
const CODE_NO_CURRENT_USER: &str = "auth/no-current-user";

/// Backend call selector used for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOp {
    CreateAccount,
    SignIn,
    SignInWithProvider,
    SignOut,
    Reauthenticate,
    DeleteAccount,
    SendPasswordReset,
    SendVerification,
    UpdateDisplayName,
    UpdateEmail,
}

/// Kind of mail recorded in the outbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    Verification,
    PasswordReset,
    VerifyNewEmail,
}

/// One recorded outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub kind: MailKind,
    pub to: String,
}

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    /// `None` for accounts created through a federated provider.
    password: Option<String>,
    pending_email: Option<String>,
}

#[derive(Default)]
struct MemoryState {
    accounts: BTreeMap<IdentityId, Account>,
    current: Option<IdentityId>,
    listeners: BTreeMap<ListenerId, SessionListener>,
    next_listener_id: ListenerId,
    federated: BTreeMap<FederatedProvider, Identity>,
    failed_sign_ins: BTreeMap<String, u32>,
    injected: Vec<(BackendOp, BackendError)>,
    outbox: Vec<SentMail>,
    calls: u64,
}

impl MemoryState {
    fn enter(&mut self, op: BackendOp) -> BackendResult<()> {
        self.calls += 1;
        match self.injected.iter().position(|(target, _)| *target == op) {
            Some(index) => Err(self.injected.remove(index).1),
            None => Ok(()),
        }
    }

    /// Matches on the trimmed address, ignoring ASCII case.
    fn account_id_by_email(&self, email: &str) -> Option<IdentityId> {
        let email = email.trim();
        self.accounts
            .values()
            .find(|account| account.identity.email.eq_ignore_ascii_case(email))
            .map(|account| account.identity.id.clone())
    }

    fn account_mut(&mut self, id: &str) -> BackendResult<&mut Account> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| BackendError::provider(CODE_USER_NOT_FOUND, "account does not exist"))
    }

    fn require_current(&self, user: &Identity) -> BackendResult<()> {
        if self.current.as_deref() == Some(user.id.as_str()) {
            Ok(())
        } else {
            Err(BackendError::provider(
                CODE_NO_CURRENT_USER,
                "identity is not signed in",
            ))
        }
    }

    fn listeners(&self) -> Vec<SessionListener> {
        self.listeners.values().cloned().collect()
    }
}

/// Identity backend keeping accounts in process memory.
#[derive(Default)]
pub struct MemoryIdentityBackend {
    inner: Mutex<MemoryState>,
}

impl MemoryIdentityBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a password account without signing it in.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        {
            let mut state = self.lock();
            let identity = Identity::new(new_identity_id(), email.trim());
            state.accounts.insert(
                identity.id.clone(),
                Account {
                    identity,
                    password: Some(password.to_string()),
                    pending_email: None,
                },
            );
        }
        self
    }

    /// Configures the identity returned by a provider's interactive flow.
    /// Without one, the flow fails as if the user closed the popup.
    pub fn with_federated_identity(self, provider: FederatedProvider, identity: Identity) -> Self {
        self.lock().federated.insert(provider, identity);
        self
    }

    /// Makes the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: BackendOp, error: BackendError) {
        self.lock().injected.push((op, error));
    }

    /// Number of backend calls made so far (subscriptions excluded).
    pub fn calls(&self) -> u64 {
        self.lock().calls
    }

    pub fn sent_mail(&self) -> Vec<SentMail> {
        self.lock().outbox.clone()
    }

    /// Identity currently signed in on the backend side.
    pub fn current_identity(&self) -> Option<Identity> {
        let state = self.lock();
        let id = state.current.as_ref()?;
        state.accounts.get(id).map(|account| account.identity.clone())
    }

    /// Looks up an account by email.
    pub fn account(&self, email: &str) -> Option<Identity> {
        let state = self.lock();
        let id = state.account_id_by_email(email)?;
        state.accounts.get(&id).map(|account| account.identity.clone())
    }

    /// Simulates the user following the verification link of `email`'s
    /// account, which marks it verified and applies any pending address.
    pub fn confirm_email(&self, email: &str) -> BackendResult<Identity> {
        let (identity, listeners) = {
            let mut state = self.lock();
            let id = state.account_id_by_email(email).ok_or_else(|| {
                BackendError::provider(CODE_USER_NOT_FOUND, "account does not exist")
            })?;
            let pending = state
                .accounts
                .get(&id)
                .and_then(|account| account.pending_email.clone());
            let holder = pending
                .as_deref()
                .and_then(|email| state.account_id_by_email(email));
            if let Some(holder) = holder {
                if holder != id {
                    return Err(BackendError::provider(
                        CODE_EMAIL_IN_USE,
                        "email address is already in use",
                    ));
                }
            }
            let account = state.account_mut(&id)?;
            if let Some(pending) = account.pending_email.take() {
                account.identity.email = pending;
            }
            account.identity.email_verified = true;
            let identity = account.identity.clone();
            let listeners = if state.current.as_deref() == Some(id.as_str()) {
                state.listeners()
            } else {
                Vec::new()
            };
            (identity, listeners)
        };
        notify(&listeners, Some(identity.clone()));
        Ok(identity)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityBackend for MemoryIdentityBackend {
    fn create_account(&self, email: &str, password: &str) -> BackendResult<Identity> {
        let (identity, listeners) = {
            let mut state = self.lock();
            state.enter(BackendOp::CreateAccount)?;
            let email = email.trim();
            validate_email(email)?;
            if password.chars().count() < MIN_PASSWORD_CHARS {
                return Err(BackendError::provider(
                    CODE_WEAK_PASSWORD,
                    format!("password should be at least {MIN_PASSWORD_CHARS} characters"),
                ));
            }
            if state.account_id_by_email(email).is_some() {
                return Err(BackendError::provider(
                    CODE_EMAIL_IN_USE,
                    "email address is already in use",
                ));
            }

            let identity = Identity::new(new_identity_id(), email);
            state.accounts.insert(
                identity.id.clone(),
                Account {
                    identity: identity.clone(),
                    password: Some(password.to_string()),
                    pending_email: None,
                },
            );
            state.current = Some(identity.id.clone());
            (identity, state.listeners())
        };
        notify(&listeners, Some(identity.clone()));
        Ok(identity)
    }

    fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Identity> {
        let (identity, listeners) = {
            let mut state = self.lock();
            state.enter(BackendOp::SignIn)?;
            validate_email(email)?;
            let key = email.trim().to_ascii_lowercase();
            if state.failed_sign_ins.get(&key).copied().unwrap_or(0) >= MAX_FAILED_SIGN_INS {
                return Err(BackendError::provider(
                    CODE_TOO_MANY_REQUESTS,
                    "too many failed sign-in attempts",
                ));
            }

            let matched = state.account_id_by_email(email).and_then(|id| {
                let account = state.accounts.get(&id)?;
                (account.password.as_deref() == Some(password)).then(|| account.identity.clone())
            });
            let Some(identity) = matched else {
                *state.failed_sign_ins.entry(key).or_insert(0) += 1;
                return Err(BackendError::provider(
                    CODE_INVALID_CREDENTIAL,
                    "email or password is incorrect",
                ));
            };

            state.failed_sign_ins.remove(&key);
            state.current = Some(identity.id.clone());
            (identity, state.listeners())
        };
        notify(&listeners, Some(identity.clone()));
        Ok(identity)
    }

    fn sign_in_with_provider(&self, provider: FederatedProvider) -> BackendResult<Identity> {
        let (identity, listeners) = {
            let mut state = self.lock();
            state.enter(BackendOp::SignInWithProvider)?;
            let Some(template) = state.federated.get(&provider).cloned() else {
                return Err(BackendError::provider(
                    CODE_POPUP_CLOSED,
                    format!("{} sign-in popup was closed", provider.as_str()),
                ));
            };

            let identity = match state.account_id_by_email(&template.email) {
                Some(id) => state.account_mut(&id)?.identity.clone(),
                None => {
                    state.accounts.insert(
                        template.id.clone(),
                        Account {
                            identity: template.clone(),
                            password: None,
                            pending_email: None,
                        },
                    );
                    template
                }
            };
            state.current = Some(identity.id.clone());
            (identity, state.listeners())
        };
        notify(&listeners, Some(identity.clone()));
        Ok(identity)
    }

    fn sign_out(&self) -> BackendResult<()> {
        let listeners = {
            let mut state = self.lock();
            state.enter(BackendOp::SignOut)?;
            state.current = None;
            state.listeners()
        };
        notify(&listeners, None);
        Ok(())
    }

    fn subscribe(&self, listener: SessionListener) -> ListenerId {
        let mut state = self.lock();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.lock().listeners.remove(&id);
    }

    fn reauthenticate(&self, user: &Identity, password: &str) -> BackendResult<()> {
        let mut state = self.lock();
        state.enter(BackendOp::Reauthenticate)?;
        state.require_current(user)?;
        let account = state.account_mut(&user.id)?;
        if account.password.as_deref() != Some(password) {
            return Err(BackendError::provider(
                CODE_INVALID_CREDENTIAL,
                "password is incorrect",
            ));
        }
        Ok(())
    }

    fn delete_account(&self, user: &Identity) -> BackendResult<()> {
        let listeners = {
            let mut state = self.lock();
            state.enter(BackendOp::DeleteAccount)?;
            state.require_current(user)?;
            let removed = state.accounts.remove(&user.id);
            if let Some(account) = removed {
                state
                    .failed_sign_ins
                    .remove(&account.identity.email.to_ascii_lowercase());
            }
            state.current = None;
            state.listeners()
        };
        notify(&listeners, None);
        Ok(())
    }

    fn send_password_reset(&self, email: &str) -> BackendResult<()> {
        let mut state = self.lock();
        state.enter(BackendOp::SendPasswordReset)?;
        validate_email(email)?;
        // Unknown addresses succeed silently so callers cannot probe accounts.
        if state.account_id_by_email(email).is_some() {
            state.outbox.push(SentMail {
                kind: MailKind::PasswordReset,
                to: email.trim().to_string(),
            });
        }
        Ok(())
    }

    fn send_verification(&self, user: &Identity) -> BackendResult<()> {
        let mut state = self.lock();
        state.enter(BackendOp::SendVerification)?;
        state.require_current(user)?;
        let to = state.account_mut(&user.id)?.identity.email.clone();
        state.outbox.push(SentMail {
            kind: MailKind::Verification,
            to,
        });
        Ok(())
    }

    fn update_display_name(&self, user: &Identity, display_name: &str) -> BackendResult<Identity> {
        let mut state = self.lock();
        state.enter(BackendOp::UpdateDisplayName)?;
        state.require_current(user)?;
        let account = state.account_mut(&user.id)?;
        account.identity = account.identity.clone().with_display_name(display_name);
        Ok(account.identity.clone())
    }

    fn verify_before_update_email(&self, user: &Identity, new_email: &str) -> BackendResult<()> {
        let mut state = self.lock();
        state.enter(BackendOp::UpdateEmail)?;
        state.require_current(user)?;
        let new_email = new_email.trim();
        validate_email(new_email)?;
        if state.account_id_by_email(new_email).is_some() {
            return Err(BackendError::provider(
                CODE_EMAIL_IN_USE,
                "email address is already in use",
            ));
        }
        let to = new_email.to_string();
        state.account_mut(&user.id)?.pending_email = Some(to.clone());
        state.outbox.push(SentMail {
            kind: MailKind::VerifyNewEmail,
            to,
        });
        Ok(())
    }
}

fn notify(listeners: &[SessionListener], user: Option<Identity>) {
    for listener in listeners {
        listener(user.clone());
    }
}

fn validate_email(email: &str) -> BackendResult<()> {
    let trimmed = email.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !trimmed.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(BackendError::provider(
            CODE_INVALID_EMAIL,
            "email address is badly formatted",
        ))
    }
}

fn new_identity_id() -> IdentityId {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::{validate_email, BackendOp, MailKind, MemoryIdentityBackend, MAX_FAILED_SIGN_INS};
    use crate::auth::backend::{BackendError, IdentityBackend};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn validate_email_rejects_malformed_addresses() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@").is_err());
        assert!(validate_email("a da@example.com").is_err());
    }

    #[test]
    fn create_account_signs_in_and_notifies_listeners() {
        let backend = MemoryIdentityBackend::new();
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        backend.subscribe(Arc::new(move |user| {
            assert!(user.is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let identity = backend
            .create_account("ada@example.com", "secret-1")
            .expect("account should be created");
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(backend.current_identity(), Some(identity));
    }

    #[test]
    fn repeated_failures_throttle_sign_in() {
        let backend = MemoryIdentityBackend::new().with_account("ada@example.com", "secret-1");
        for _ in 0..MAX_FAILED_SIGN_INS {
            let err = backend
                .sign_in_with_password("ada@example.com", "wrong")
                .expect_err("wrong password should fail");
            assert_eq!(err.code(), Some("auth/invalid-credential"));
        }

        let err = backend
            .sign_in_with_password("ada@example.com", "secret-1")
            .expect_err("throttled account should fail even with the right password");
        assert_eq!(err.code(), Some("auth/too-many-requests"));
    }

    #[test]
    fn injected_failure_is_consumed_once() {
        let backend = MemoryIdentityBackend::new().with_account("ada@example.com", "secret-1");
        backend.fail_next(BackendOp::SignIn, BackendError::transport("offline"));

        let err = backend
            .sign_in_with_password("ada@example.com", "secret-1")
            .expect_err("injected failure should surface");
        assert_eq!(err, BackendError::transport("offline"));
        backend
            .sign_in_with_password("ada@example.com", "secret-1")
            .expect("second attempt should succeed");
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn padded_duplicate_email_is_rejected() {
        let backend = MemoryIdentityBackend::new();
        let first = backend
            .create_account("ada@example.com", "secret-1")
            .expect("first account");

        let err = backend
            .create_account("  ADA@example.com ", "secret-2")
            .expect_err("padded duplicate must be rejected");
        assert_eq!(err.code(), Some("auth/email-already-in-use"));
        assert_eq!(backend.account(" ada@example.com"), Some(first));
    }

    #[test]
    fn padded_email_change_to_taken_address_is_rejected() {
        let backend = MemoryIdentityBackend::new()
            .with_account("bob@example.com", "secret-2")
            .with_account("ada@example.com", "secret-1");
        let identity = backend
            .sign_in_with_password(" ada@example.com", "secret-1")
            .expect("padded sign in");

        let err = backend
            .verify_before_update_email(&identity, " bob@example.com")
            .expect_err("taken address must be rejected");
        assert_eq!(err.code(), Some("auth/email-already-in-use"));
        assert!(backend.sent_mail().is_empty());
    }

    #[test]
    fn confirmation_never_duplicates_an_address() {
        let backend = MemoryIdentityBackend::new().with_account("ada@example.com", "secret-1");
        let identity = backend
            .sign_in_with_password("ada@example.com", "secret-1")
            .expect("sign in");
        backend
            .verify_before_update_email(&identity, "lovelace@example.com")
            .expect("verification mail");
        backend.sign_out().expect("sign out");
        backend
            .create_account("lovelace@example.com", "secret-2")
            .expect("address still free");

        let err = backend
            .confirm_email("ada@example.com")
            .expect_err("address was taken meanwhile");
        assert_eq!(err.code(), Some("auth/email-already-in-use"));
        assert_eq!(
            backend.account("ada@example.com").map(|user| user.email),
            Some("ada@example.com".to_string())
        );
    }

    #[test]
    fn email_change_waits_for_confirmation() {
        let backend = MemoryIdentityBackend::new().with_account("ada@example.com", "secret-1");
        let identity = backend
            .sign_in_with_password("ada@example.com", "secret-1")
            .expect("sign in");

        backend
            .verify_before_update_email(&identity, "lovelace@example.com")
            .expect("verification mail should be sent");
        assert_eq!(
            backend.current_identity().map(|user| user.email),
            Some("ada@example.com".to_string())
        );
        let mail = backend.sent_mail();
        assert_eq!(mail.len(), 1);
        assert_eq!(mail[0].kind, MailKind::VerifyNewEmail);

        let confirmed = backend
            .confirm_email("ada@example.com")
            .expect("confirmation should apply pending email");
        assert_eq!(confirmed.email, "lovelace@example.com");
        assert!(confirmed.email_verified);
    }
}
