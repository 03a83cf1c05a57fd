//! Builds requests against the API base path and hands them to the transport.
//!
//! No retries happen here; that is the caller's business.

use crate::middleware::Pipeline;
use scribe_types::{
    CredentialStore, Method, Transport, TransportFailure, TransportRequest, TransportResponse,
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};

/// A request relative to the API base path.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base, e.g. `admin/post/1`.
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

pub struct Dispatcher {
    base: String,
    transport: Arc<dyn Transport>,
    pipeline: Pipeline,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// Creates a dispatcher with the standard pipeline (bearer auth + response logging).
    pub fn new(
        base: impl Into<String>,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            transport,
            pipeline: Pipeline::standard(credentials),
            timeout,
        }
    }

    /// Replaces the middleware pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URL for a path relative to the base.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Sends `request` with whatever access token the store holds right now.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] only when no response was received.
    pub async fn execute(
        &self,
        request: &ApiRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        self.dispatch(request, None).await
    }

    /// Sends `request` with `token` as the bearer credential, overriding the store.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] only when no response was received.
    pub async fn execute_with_token(
        &self,
        request: &ApiRequest,
        token: &str,
    ) -> Result<TransportResponse, TransportFailure> {
        self.dispatch(request, Some(token)).await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<TransportResponse, TransportFailure> {
        let outgoing = TransportRequest::new(request.method.clone(), self.url(&request.path))
            .with_query(request.query.clone())
            .with_body(request.body.clone())
            .with_timeout(self.timeout);
        let mut outgoing = self.pipeline.apply_request(outgoing);
        if let Some(token) = token {
            outgoing.set_bearer(token);
        }

        let response = self.transport.send(outgoing.clone()).await?;
        Ok(self.pipeline.apply_response(&outgoing, response))
    }
}
