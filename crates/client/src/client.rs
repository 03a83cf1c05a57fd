//! The authenticated request pipeline.
//!
//! `ApiClient::send` = dispatch → classify → on 401, one shared refresh →
//! one retry with the new token. A failed refresh is terminal: the user is
//! told the session expired and the navigator is asked to show the login page.

use crate::{
    classifier::classify,
    dispatcher::{ApiRequest, Dispatcher},
    services::{AuthApi, CategoryApi, PostApi, TagApi},
    transport::ReqwestTransport,
};
use scribe_auth::{RefreshCoordinator, RefreshSettings};
use scribe_config::Config;
use scribe_types::{
    ApiError, CredentialStore, Method, Navigator, Notifier, RefreshError, SessionStore,
    Transport, error::SESSION_EXPIRED_MESSAGE, traits::Result,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub struct ApiClient {
    dispatcher: Dispatcher,
    coordinator: RefreshCoordinator,
    session: Arc<dyn SessionStore>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    login_path: String,
}

/// Login endpoint used when none is configured.
pub const DEFAULT_LOGIN_PATH: &str = "auth/login";

impl ApiClient {
    /// Assembles a client from its parts. The coordinator must write to the
    /// same credential store the dispatcher reads from.
    pub fn new(
        dispatcher: Dispatcher,
        coordinator: RefreshCoordinator,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            dispatcher,
            coordinator,
            session,
            notifier: None,
            navigator: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    /// Wires dispatcher and coordinator from `config` over a shared transport.
    pub fn from_config(
        config: &Config,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            config.api_base(),
            Arc::clone(&transport),
            Arc::clone(&credentials),
            config.timeout(),
        );
        let coordinator = RefreshCoordinator::new(
            transport,
            credentials,
            Arc::clone(&session),
            RefreshSettings {
                url: dispatcher.url(&config.refresh_path),
                timeout: config.refresh_timeout(),
            },
        );
        Self::new(dispatcher, coordinator, session).with_login_path(&config.login_path)
    }

    /// [`ApiClient::from_config`] over a default `reqwest` transport.
    pub fn with_reqwest(
        config: &Config,
        credentials: Arc<dyn CredentialStore>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self::from_config(
            config,
            Arc::new(ReqwestTransport::default()),
            credentials,
            session,
        )
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: &str) -> Self {
        self.login_path = path.to_string();
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        self.coordinator.credentials()
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    #[must_use]
    pub fn posts(&self) -> PostApi<'_> {
        PostApi::new(self)
    }

    #[must_use]
    pub fn tags(&self) -> TagApi<'_> {
        TagApi::new(self)
    }

    #[must_use]
    pub fn categories(&self) -> CategoryApi<'_> {
        CategoryApi::new(self)
    }

    /// Executes `method path` and resolves with the unwrapped envelope `data`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`]; see [`ApiClient::send`].
    pub async fn execute(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
        query: Vec<(String, String)>,
    ) -> Result<Value> {
        let mut request = ApiRequest::new(method, path).query(query);
        request.body = body;
        self.send(&request).await
    }

    /// Sends `request`, recovering once from an expired access token.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Business`] / [`ApiError::Transport`] as classified.
    /// - [`ApiError::Authentication`] if the retry after a successful refresh
    ///   is rejected again; no further retry is attempted.
    /// - [`ApiError::Refresh`] if the refresh failed; the session is gone.
    pub async fn send(&self, request: &ApiRequest) -> Result<Value> {
        match self.attempt(request, None).await {
            Err(ApiError::Authentication { .. }) => {}
            other => return other,
        }

        tracing::debug!(path = %request.path, "access token rejected, refreshing");
        let token = match self.coordinator.refresh().await {
            Ok(token) => token,
            Err(e) => {
                self.session_expired(&e);
                return Err(ApiError::Refresh(e));
            }
        };

        self.attempt(request, Some(&token)).await
    }

    /// Like [`ApiClient::send`], decoding `data` into `T`.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::send`], plus [`ApiError::Serialization`] if `data` does
    /// not match `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let data = self.send(request).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Sends `request` once and classifies the answer; a 401 is returned as is.
    ///
    /// For endpoints where an expired token cannot be the problem, such as login.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn send_without_refresh(&self, request: &ApiRequest) -> Result<Value> {
        self.attempt(request, None).await
    }

    /// Obtain a new access token through the shared coordinator.
    ///
    /// # Errors
    ///
    /// Returns the [`RefreshError`] of the refresh this call joined.
    pub async fn refresh(&self) -> std::result::Result<String, RefreshError> {
        self.coordinator.refresh().await
    }

    /// Shows `err` to the user through the notifier, or logs it when none is set.
    pub fn report(&self, err: &ApiError) {
        self.notify(&err.message());
    }

    async fn attempt(&self, request: &ApiRequest, token: Option<&str>) -> Result<Value> {
        let response = match token {
            Some(token) => self.dispatcher.execute_with_token(request, token).await,
            None => self.dispatcher.execute(request).await,
        }?;
        classify(&response)
    }

    /// Every terminal refresh failure leaves the store empty and the session
    /// invalid, including the ones the coordinator never got to act on
    /// (`NoRefreshToken`, `Interrupted`).
    fn session_expired(&self, cause: &RefreshError) {
        tracing::warn!(error = %cause, "session expired");
        scribe_auth::logout(self.credentials().as_ref(), self.session.as_ref());
        self.notify(SESSION_EXPIRED_MESSAGE);
        match &self.navigator {
            Some(navigator) => navigator.redirect_to_login(),
            None => tracing::info!("no navigator installed, login redirect not signalled"),
        }
    }

    fn notify(&self, message: &str) {
        match &self.notifier {
            Some(notifier) => notifier.notify_error(message),
            None => tracing::error!(error = message, "request failed (no notifier installed)"),
        }
    }
}
