//! Core types and traits for the scribe workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! scribe admin client, including the classified error taxonomy, the API
//! envelope, credential payloads, transport values, and the collaborator
//! traits that each layer implements or consumes.

pub mod blog;
pub mod envelope;
pub mod error;
pub mod token;
pub mod traits;
pub mod transport;

pub use blog::{Category, PageQuery, Post, PostParams, PostStatus, Tag, TaxonomyParams};
pub use envelope::{ApiEnvelope, PageResult, SUCCESS_CODE};
pub use error::{ApiError, ErrorKind, RefreshError, TransportFailure};
pub use token::{Credentials, LoginParams, LoginType, TokenPair, UserInfo};
pub use traits::{CredentialStore, Navigator, Notifier, SessionStore, Transport};
pub use transport::{TransportRequest, TransportResponse};

pub use http::{Method, StatusCode};
