//! Credential and session storage backends.
//!
//! Provides in-memory stores for tests and ephemeral sessions, and a JSON
//! file-backed credential and session stores for the CLI.

pub mod file;
pub mod memory;

pub use file::{FileCredentialStore, FileSessionStore};
pub use memory::{InMemoryCredentialStore, InMemorySessionStore};
