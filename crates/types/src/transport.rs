//! Transport-level request and response values.
//!
//! These are the typed envelopes that flow through the middleware pipeline:
//! request middleware maps a [`TransportRequest`] to a [`TransportRequest`],
//! response middleware maps a [`TransportResponse`] to a [`TransportResponse`].

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use serde_json::Value;
use std::time::Duration;

/// A fully resolved outgoing request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL without the query string.
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    /// JSON body, serialized by the transport.
    pub body: Option<Value>,
    /// `None` disables the timeout.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets `Authorization: Bearer <token>`, replacing any previous value.
    ///
    /// A token that cannot be encoded as a header value is skipped.
    pub fn set_bearer(&mut self, token: &str) {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            self.headers.insert(header::AUTHORIZATION, value);
        }
    }

    /// Returns the bearer token attached to this request, if any.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    /// Returns the first query value for `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A raw response as returned by the transport, before classification.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Builds a JSON response with the matching content type.
    #[must_use]
    pub fn json(status: StatusCode, body: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
