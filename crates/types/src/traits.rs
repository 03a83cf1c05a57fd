//! Collaborator traits shared across all scribe crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `scribe-types`, not on each other.

use crate::{ApiError, Credentials, TransportFailure, TransportRequest, TransportResponse, UserInfo};
use async_trait::async_trait;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Process-wide holder of the current access/refresh credential pair.
///
/// Reads are synchronous so the dispatcher can consult the store right before
/// every send without an extra suspension point.
pub trait CredentialStore: Send + Sync {
    /// The current access token, if any.
    fn access_token(&self) -> Option<String>;
    /// The current refresh token, if any.
    fn refresh_token(&self) -> Option<String>;
    /// Replace both credentials atomically.
    fn set_credentials(&self, access_token: &str, refresh_token: &str);
    /// Forget both credentials.
    fn clear_credentials(&self);

    /// Both credentials, when both are present.
    fn credentials(&self) -> Option<Credentials> {
        Some(Credentials::new(self.access_token()?, self.refresh_token()?))
    }
}

/// Session-level authenticated state held outside the HTTP core.
pub trait SessionStore: Send + Sync {
    /// Mark the session authenticated as `user`.
    fn set_user(&self, user: UserInfo);
    /// The authenticated user, if any.
    fn user(&self) -> Option<UserInfo>;
    /// Drop the authenticated user; called on unrecoverable refresh failure.
    fn invalidate_session(&self);

    fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

/// Fire-and-forget, user-facing error sink.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Receives the "go to login" signal when the session cannot be recovered.
///
/// The core only signals; performing the navigation is up to the implementor.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Generic request/response primitive. Connection management belongs to the implementor.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return whatever the server answered, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] only when no response was received.
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportFailure>;
}
