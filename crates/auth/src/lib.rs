//! Credential lifecycle for the scribe client.
//!
//! The [`RefreshCoordinator`] guarantees at most one refresh call is in flight
//! no matter how many requests hit an expired access token at once; the
//! [`session`] helpers cover logout and the local "am I logged in" check.

pub mod coordinator;
pub mod session;

pub use coordinator::{RefreshCoordinator, RefreshSettings};
pub use session::{is_authenticated, logout};
