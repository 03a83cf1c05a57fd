//! Typed wrappers over the admin API endpoints.
//!
//! Each service borrows an [`ApiClient`](crate::ApiClient) and only knows paths
//! and payload shapes; every call goes through the authenticated pipeline.

pub mod auth;
pub mod categories;
pub mod posts;
pub mod tags;

pub use auth::AuthApi;
pub use categories::CategoryApi;
pub use posts::PostApi;
pub use tags::TagApi;

use crate::query::to_query_pairs;
use scribe_types::{PageQuery, traits::Result};

/// Prefix shared by all content-management endpoints.
pub(crate) const ADMIN: &str = "admin";

pub(crate) fn page_pairs(query: &PageQuery) -> Result<Vec<(String, String)>> {
    Ok(to_query_pairs(query)?)
}
