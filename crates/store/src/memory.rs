//! In-memory credential and session stores backed by a `Mutex`.

use scribe_types::{CredentialStore, Credentials, SessionStore, UserInfo};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-memory [`CredentialStore`] for tests and ephemeral use.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    data: Mutex<Option<Credentials>>,
}

impl InMemoryCredentialStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            data: Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn access_token(&self) -> Option<String> {
        lock(&self.data).as_ref().map(|c| c.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        lock(&self.data).as_ref().map(|c| c.refresh_token.clone())
    }

    fn set_credentials(&self, access_token: &str, refresh_token: &str) {
        *lock(&self.data) = Some(Credentials::new(access_token, refresh_token));
    }

    fn clear_credentials(&self) {
        lock(&self.data).take();
    }

    fn credentials(&self) -> Option<Credentials> {
        lock(&self.data).clone()
    }
}

/// An in-memory [`SessionStore`].
#[derive(Default)]
pub struct InMemorySessionStore {
    user: Mutex<Option<UserInfo>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn set_user(&self, user: UserInfo) {
        *lock(&self.user) = Some(user);
    }

    fn user(&self) -> Option<UserInfo> {
        lock(&self.user).clone()
    }

    fn invalidate_session(&self) {
        lock(&self.user).take();
    }
}
