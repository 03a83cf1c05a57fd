//! [`Transport`] implementation over `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use scribe_types::{Transport, TransportFailure, TransportRequest, TransportResponse};

/// Sends [`TransportRequest`]s with a shared `reqwest` client and hands back
/// every response, successful or not, for classification.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Creates a new transport wrapping the given HTTP client.
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Returns a reference to the inner HTTP client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.http
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        let TransportRequest {
            method,
            url,
            headers,
            query,
            body,
            timeout,
        } = request;

        let mut builder = self.http.request(method, &url).headers(headers);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_types::{Method, StatusCode};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_sends_method_query_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/admin/post"))
            .and(query_param("draft", "true"))
            .and(header("authorization", "Bearer a1"))
            .and(body_json(json!({"id": "1", "title": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errorCode": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = TransportRequest::new(Method::PUT, format!("{}/api/admin/post", server.uri()))
            .with_query(vec![("draft".into(), "true".into())])
            .with_body(Some(json!({"id": "1", "title": "hello"})));
        request.set_bearer("a1");

        let resp = ReqwestTransport::default().send(request).await.unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&resp.body).unwrap(),
            json!({"errorCode": 0})
        );
    }

    #[tokio::test]
    async fn test_error_status_is_still_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let resp = ReqwestTransport::default()
            .send(TransportRequest::new(Method::GET, server.uri()))
            .await
            .unwrap();
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert_eq!(&resp.body[..], b"expired");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = ReqwestTransport::default()
            .send(
                TransportRequest::new(Method::GET, server.uri())
                    .with_timeout(Some(Duration::from_millis(50))),
            )
            .await
            .unwrap_err();
        assert_eq!(err, TransportFailure::Timeout);
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_a_response() {
        let t = ReqwestTransport::default();
        let err = t
            .send(TransportRequest::new(Method::GET, "not a url"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportFailure::InvalidRequest(_) | TransportFailure::Network(_)
        ));
    }
}
