//! Single-flight credential refresh.
//!
//! Responsibilities:
//! - Issue at most one refresh call at a time, however many callers ask.
//! - Park every concurrent caller as a waiter and settle waiters in FIFO order
//!   with the outcome of the one in-flight refresh.
//! - On success, store the new pair; on failure, clear credentials and the
//!   user session.
//! - Run the refresh to completion even if the caller that started it goes away.
use scribe_types::{
    ApiEnvelope, CredentialStore, Method, RefreshError, SessionStore, TokenPair, Transport,
    TransportRequest,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::oneshot;

/// Query parameter carrying the refresh token.
pub const REFRESH_TOKEN_PARAM: &str = "refresh_token";
/// Cache-busting timestamp query parameter.
pub const TIMESTAMP_PARAM: &str = "t";

type Outcome = Result<String, RefreshError>;
type Waiter = oneshot::Sender<Outcome>;

/// Where and how to call the refresh endpoint.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    /// Absolute URL of the refresh endpoint.
    pub url: String,
    pub timeout: Duration,
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<Waiter>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    session: Arc<dyn SessionStore>,
    settings: RefreshSettings,
    state: Mutex<RefreshState>,
}

/// Owned single-flight refresh coordinator.
///
/// Cheap to clone; clones share the same in-flight state. Separate instances
/// never share state, so tests can build isolated ones.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        session: Arc<dyn SessionStore>,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                credentials,
                session,
                settings,
                state: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// The credential store this coordinator writes to.
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    /// Returns `true` while a refresh call is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.lock().refreshing
    }

    /// Number of callers parked behind the in-flight refresh.
    #[must_use]
    pub fn pending_waiters(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    /// Obtain a fresh access token, sharing one refresh call among all
    /// concurrent callers.
    ///
    /// # Errors
    ///
    /// - [`RefreshError::NoRefreshToken`] immediately, without touching shared
    ///   state, when the store holds no refresh token.
    /// - The failure of the in-flight refresh otherwise; every caller that
    ///   shared it receives the same error.
    pub async fn refresh(&self) -> Outcome {
        let Some(refresh_token) = self.inner.credentials.refresh_token() else {
            return Err(RefreshError::NoRefreshToken);
        };

        // Check-and-set happens under one lock, before any await.
        let parked = {
            let mut state = self.inner.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        if let Some(rx) = parked {
            tracing::debug!("refresh already in flight, waiting for its result");
            return rx.await.unwrap_or(Err(RefreshError::Interrupted));
        }

        // Spawned so that dropping this future cannot strand the waiters.
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(refresh_token).await })
            .await
            .unwrap_or(Err(RefreshError::Interrupted))
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, refresh_token: String) -> Outcome {
        let mut in_flight = InFlight {
            inner: self,
            settled: false,
        };

        let outcome = match self.request_pair(&refresh_token).await {
            Ok(pair) => {
                self.credentials
                    .set_credentials(&pair.access_token, &pair.refresh_token);
                tracing::info!("access token refreshed");
                Ok(pair.access_token)
            }
            Err(e) => {
                self.credentials.clear_credentials();
                self.session.invalidate_session();
                tracing::warn!(error = %e, "token refresh failed, session invalidated");
                Err(e)
            }
        };

        in_flight.settle(&outcome);
        outcome
    }

    async fn request_pair(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        let request = TransportRequest::new(Method::POST, self.settings.url.clone())
            .with_query(vec![
                (TIMESTAMP_PARAM.to_string(), now_millis().to_string()),
                (REFRESH_TOKEN_PARAM.to_string(), refresh_token.to_string()),
            ])
            .with_timeout(Some(self.settings.timeout));

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(RefreshError::Transport(format!(
                "HTTP Error {}",
                response.status.as_u16()
            )));
        }

        let envelope = ApiEnvelope::from_slice(&response.body)
            .ok_or_else(|| RefreshError::Malformed("body is not an API envelope".into()))?;

        if !envelope.is_success() {
            return Err(RefreshError::Rejected {
                code: envelope.error_code,
                message: envelope.description().unwrap_or("refresh failed").to_string(),
            });
        }

        serde_json::from_value(envelope.data).map_err(|e| RefreshError::Malformed(e.to_string()))
    }
}

/// Clears the in-flight flag and settles waiters, on every exit path.
struct InFlight<'a> {
    inner: &'a Inner,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, outcome: &Outcome) {
        self.settled = true;
        let waiters = {
            let mut state = self.inner.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        if !waiters.is_empty() {
            tracing::debug!(waiters = waiters.len(), ok = outcome.is_ok(), "settling refresh waiters");
        }
        for waiter in waiters {
            // A waiter whose caller went away is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(&Err(RefreshError::Interrupted));
        }
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scribe_store::{InMemoryCredentialStore, InMemorySessionStore};
    use scribe_types::{
        Credentials, StatusCode, TransportFailure, TransportResponse, UserInfo,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const REFRESH_URL: &str = "http://blog.test/api/auth/refresh";

    /// Answers every call with a fixed result, optionally holding each call
    /// until the gate is opened.
    struct RefreshEndpoint {
        calls: AtomicUsize,
        seen: Mutex<Vec<TransportRequest>>,
        gate: Option<Arc<Notify>>,
        reply: std::result::Result<TransportResponse, TransportFailure>,
    }

    impl RefreshEndpoint {
        fn new(reply: std::result::Result<TransportResponse, TransportFailure>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                gate: None,
                reply,
            }
        }

        fn ok_pair(access: &str, refresh: &str) -> Self {
            Self::new(Ok(TransportResponse::json(
                StatusCode::OK,
                &json!({
                    "errorCode": 0,
                    "errorDesc": "",
                    "data": {"accessToken": access, "refreshToken": refresh, "expiresIn": "7200"}
                }),
            )))
        }

        fn gated(mut self, gate: &Arc<Notify>) -> Self {
            self.gate = Some(Arc::clone(gate));
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for RefreshEndpoint {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> std::result::Result<TransportResponse, TransportFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.reply.clone()
        }
    }

    struct Fixture {
        endpoint: Arc<RefreshEndpoint>,
        credentials: Arc<InMemoryCredentialStore>,
        session: Arc<InMemorySessionStore>,
        coordinator: RefreshCoordinator,
    }

    fn fixture(endpoint: RefreshEndpoint, stored: Option<Credentials>) -> Fixture {
        let endpoint = Arc::new(endpoint);
        let credentials = Arc::new(match stored {
            Some(c) => InMemoryCredentialStore::with_credentials(c),
            None => InMemoryCredentialStore::new(),
        });
        let session = Arc::new(InMemorySessionStore::new());
        session.set_user(UserInfo::new("admin"));
        let coordinator = RefreshCoordinator::new(
            endpoint.clone(),
            credentials.clone(),
            session.clone(),
            RefreshSettings {
                url: REFRESH_URL.into(),
                timeout: Duration::from_secs(5),
            },
        );
        Fixture {
            endpoint,
            credentials,
            session,
            coordinator,
        }
    }

    fn old_pair() -> Option<Credentials> {
        Some(Credentials::new("old-access", "old-refresh"))
    }

    async fn wait_for_waiters(coordinator: &RefreshCoordinator, n: usize) {
        while coordinator.pending_waiters() < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_no_refresh_token_fails_without_network() {
        let f = fixture(RefreshEndpoint::ok_pair("a2", "r2"), None);
        let err = f.coordinator.refresh().await.unwrap_err();
        assert_eq!(err, RefreshError::NoRefreshToken);
        assert_eq!(f.endpoint.calls(), 0);
        assert!(!f.coordinator.is_refreshing());
        // Shared state untouched: the session survives.
        assert!(f.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_success_stores_new_pair() {
        let f = fixture(RefreshEndpoint::ok_pair("new-access", "new-refresh"), old_pair());
        let token = f.coordinator.refresh().await.unwrap();
        assert_eq!(token, "new-access");
        assert_eq!(
            f.credentials.credentials(),
            Some(Credentials::new("new-access", "new-refresh"))
        );
        assert!(f.session.is_authenticated());
        assert!(!f.coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_refresh_request_wire_shape() {
        let f = fixture(RefreshEndpoint::ok_pair("a2", "r2"), old_pair());
        f.coordinator.refresh().await.unwrap();

        let seen = f.endpoint.seen.lock().unwrap();
        let req = &seen[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, REFRESH_URL);
        assert_eq!(req.query_value(REFRESH_TOKEN_PARAM), Some("old-refresh"));
        assert!(req.query_value(TIMESTAMP_PARAM).unwrap().parse::<u128>().is_ok());
        assert_eq!(req.bearer(), None);
        assert_eq!(req.timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_rejected_envelope_clears_everything() {
        let f = fixture(
            RefreshEndpoint::new(Ok(TransportResponse::json(
                StatusCode::OK,
                &json!({"errorCode": 1003, "errorDesc": "refresh token revoked", "data": null}),
            ))),
            old_pair(),
        );
        let err = f.coordinator.refresh().await.unwrap_err();
        assert_eq!(
            err,
            RefreshError::Rejected {
                code: 1003,
                message: "refresh token revoked".into()
            }
        );
        assert!(f.credentials.credentials().is_none());
        assert!(!f.session.is_authenticated());
        assert!(!f.coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_network_failure_clears_everything() {
        let f = fixture(
            RefreshEndpoint::new(Err(TransportFailure::Timeout)),
            old_pair(),
        );
        let err = f.coordinator.refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::Transport(_)));
        assert!(f.credentials.credentials().is_none());
        assert!(!f.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_non_2xx_is_transport_failure() {
        let f = fixture(
            RefreshEndpoint::new(Ok(TransportResponse::new(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
            ))),
            old_pair(),
        );
        let err = f.coordinator.refresh().await.unwrap_err();
        assert_eq!(err, RefreshError::Transport("HTTP Error 401".into()));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let f = fixture(
            RefreshEndpoint::new(Ok(TransportResponse::new(StatusCode::OK, "<html/>"))),
            old_pair(),
        );
        assert!(matches!(
            f.coordinator.refresh().await.unwrap_err(),
            RefreshError::Malformed(_)
        ));

        let f = fixture(
            RefreshEndpoint::new(Ok(TransportResponse::json(
                StatusCode::OK,
                &json!({"errorCode": 0, "errorDesc": "", "data": null}),
            ))),
            old_pair(),
        );
        assert!(matches!(
            f.coordinator.refresh().await.unwrap_err(),
            RefreshError::Malformed(_)
        ));
        assert!(f.credentials.credentials().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_call() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            RefreshEndpoint::ok_pair("shared-access", "shared-refresh").gated(&gate),
            old_pair(),
        );

        let mut handles = Vec::new();
        for _ in 0..5 {
            let c = f.coordinator.clone();
            handles.push(tokio::spawn(async move { c.refresh().await }));
        }
        wait_for_waiters(&f.coordinator, 4).await;
        assert!(f.coordinator.is_refreshing());
        gate.notify_one();

        for h in futures::future::join_all(handles).await {
            assert_eq!(h.unwrap().unwrap(), "shared-access");
        }
        assert_eq!(f.endpoint.calls(), 1);
        assert_eq!(f.coordinator.pending_waiters(), 0);
        assert!(!f.coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_failure() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            RefreshEndpoint::new(Ok(TransportResponse::json(
                StatusCode::OK,
                &json!({"errorCode": 1003, "errorDesc": "revoked", "data": null}),
            )))
            .gated(&gate),
            old_pair(),
        );

        let mut handles = Vec::new();
        for _ in 0..3 {
            let c = f.coordinator.clone();
            handles.push(tokio::spawn(async move { c.refresh().await }));
        }
        wait_for_waiters(&f.coordinator, 2).await;
        gate.notify_one();

        let expected = RefreshError::Rejected {
            code: 1003,
            message: "revoked".into(),
        };
        for h in futures::future::join_all(handles).await {
            assert_eq!(h.unwrap().unwrap_err(), expected);
        }
        assert_eq!(f.endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn test_waiters_settle_in_fifo_order() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            RefreshEndpoint::ok_pair("a2", "r2").gated(&gate),
            old_pair(),
        );

        let leader = {
            let c = f.coordinator.clone();
            tokio::spawn(async move { c.refresh().await })
        };
        while !f.coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut waiters = Vec::new();
        for id in 1..=3 {
            let c = f.coordinator.clone();
            let order = Arc::clone(&order);
            waiters.push(tokio::spawn(async move {
                let res = c.refresh().await;
                order.lock().unwrap().push(id);
                res
            }));
            wait_for_waiters(&f.coordinator, id).await;
        }

        gate.notify_one();
        leader.await.unwrap().unwrap();
        for w in waiters {
            w.await.unwrap().unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_refresh_runs_again_after_settling() {
        let f = fixture(RefreshEndpoint::ok_pair("a2", "r2"), old_pair());
        f.coordinator.refresh().await.unwrap();
        f.coordinator.refresh().await.unwrap();
        assert_eq!(f.endpoint.calls(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_leader_still_settles_waiters() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            RefreshEndpoint::ok_pair("a2", "r2").gated(&gate),
            old_pair(),
        );

        let leader = {
            let c = f.coordinator.clone();
            tokio::spawn(async move { c.refresh().await })
        };
        while !f.coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }
        let waiter = {
            let c = f.coordinator.clone();
            tokio::spawn(async move { c.refresh().await })
        };
        wait_for_waiters(&f.coordinator, 1).await;

        leader.abort();
        gate.notify_one();

        assert_eq!(waiter.await.unwrap().unwrap(), "a2");
        assert!(!f.coordinator.is_refreshing());
        assert_eq!(f.credentials.access_token().as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn test_isolated_instances_do_not_share_state() {
        let gate = Arc::new(Notify::new());
        let a = fixture(RefreshEndpoint::ok_pair("a", "ra").gated(&gate), old_pair());
        let b = fixture(RefreshEndpoint::ok_pair("b", "rb"), old_pair());

        let pending = {
            let c = a.coordinator.clone();
            tokio::spawn(async move { c.refresh().await })
        };
        while !a.coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }
        assert!(!b.coordinator.is_refreshing());
        assert_eq!(b.coordinator.refresh().await.unwrap(), "b");

        gate.notify_one();
        assert_eq!(pending.await.unwrap().unwrap(), "a");
    }
}
