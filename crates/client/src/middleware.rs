//! Ordered request/response middleware.
//!
//! Request middleware run left-to-right before the transport call, response
//! middleware run left-to-right after it. The transport `send` is the only
//! suspension point between the two stages.

use scribe_types::{CredentialStore, TransportRequest, TransportResponse};
use std::sync::Arc;

/// Transforms an outgoing request.
pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: TransportRequest) -> TransportRequest;
}

/// Transforms an incoming response before classification.
pub trait ResponseMiddleware: Send + Sync {
    fn on_response(
        &self,
        request: &TransportRequest,
        response: TransportResponse,
    ) -> TransportResponse;
}

/// An ordered list of middleware for both stages.
#[derive(Clone, Default)]
pub struct Pipeline {
    request: Vec<Arc<dyn RequestMiddleware>>,
    response: Vec<Arc<dyn ResponseMiddleware>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bearer auth from `credentials`, plus debug logging of every response.
    #[must_use]
    pub fn standard(credentials: Arc<dyn CredentialStore>) -> Self {
        Self::new()
            .with_request(BearerAuth::new(credentials))
            .with_response(ResponseLogger)
    }

    /// Appends a request middleware.
    #[must_use]
    pub fn with_request(mut self, m: impl RequestMiddleware + 'static) -> Self {
        self.request.push(Arc::new(m));
        self
    }

    /// Appends a response middleware.
    #[must_use]
    pub fn with_response(mut self, m: impl ResponseMiddleware + 'static) -> Self {
        self.response.push(Arc::new(m));
        self
    }

    pub fn apply_request(&self, request: TransportRequest) -> TransportRequest {
        self.request
            .iter()
            .fold(request, |req, m| m.on_request(req))
    }

    pub fn apply_response(
        &self,
        request: &TransportRequest,
        response: TransportResponse,
    ) -> TransportResponse {
        self.response
            .iter()
            .fold(response, |resp, m| m.on_response(request, resp))
    }
}

/// Attaches `Authorization: Bearer <access token>` when the store holds one.
pub struct BearerAuth {
    credentials: Arc<dyn CredentialStore>,
}

impl BearerAuth {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }
}

impl RequestMiddleware for BearerAuth {
    fn on_request(&self, mut request: TransportRequest) -> TransportRequest {
        if let Some(token) = self.credentials.access_token() {
            request.set_bearer(&token);
        }
        request
    }
}

/// Logs method, URL and status of every response at `debug`.
pub struct ResponseLogger;

impl ResponseMiddleware for ResponseLogger {
    fn on_response(
        &self,
        request: &TransportRequest,
        response: TransportResponse,
    ) -> TransportResponse {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status.as_u16(),
            bytes = response.body.len(),
            "response received"
        );
        response
    }
}
