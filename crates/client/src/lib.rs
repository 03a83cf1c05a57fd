//! HTTP client for the blog admin API.
//!
//! Requests flow through a middleware [`Pipeline`](middleware::Pipeline) into a
//! [`Transport`](scribe_types::Transport); responses are classified into data or
//! an [`ApiError`](scribe_types::ApiError). An expired access token is renewed
//! once through the shared [`RefreshCoordinator`](scribe_auth::RefreshCoordinator)
//! and the request is retried with the new token.

pub mod classifier;
pub mod client;
pub mod dispatcher;
pub mod middleware;
pub mod query;
pub mod services;
pub mod transport;

pub use classifier::classify;
pub use client::{ApiClient, DEFAULT_LOGIN_PATH};
pub use dispatcher::{ApiRequest, Dispatcher};
pub use middleware::{BearerAuth, Pipeline, RequestMiddleware, ResponseLogger, ResponseMiddleware};
pub use query::to_query_pairs;
pub use services::{AuthApi, CategoryApi, PostApi, TagApi};
pub use transport::ReqwestTransport;
