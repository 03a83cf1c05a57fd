//! Local session helpers.

use scribe_types::{CredentialStore, SessionStore};

/// Forget the stored credentials and the authenticated user.
pub fn logout(credentials: &dyn CredentialStore, session: &dyn SessionStore) {
    credentials.clear_credentials();
    session.invalidate_session();
    tracing::info!("logged out");
}

/// Returns `true` if an access token is present. The server stays the judge of
/// whether it is still valid.
#[must_use]
pub fn is_authenticated(credentials: &dyn CredentialStore) -> bool {
    credentials.access_token().is_some()
}
