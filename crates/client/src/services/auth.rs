//! Login against the auth endpoint.

use crate::{ApiClient, dispatcher::ApiRequest};
use scribe_types::{LoginParams, TokenPair, UserInfo, traits::Result};

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Logs in, stores the issued credential pair and marks the session
    /// authenticated as `params.identifier`.
    ///
    /// A 401 here means bad credentials, so no refresh is attempted.
    ///
    /// # Errors
    ///
    /// Returns the classified [`scribe_types::ApiError`] of the login call, or
    /// [`scribe_types::ApiError::Serialization`] if the token payload is malformed.
    pub async fn login(&self, params: &LoginParams) -> Result<TokenPair> {
        let request =
            ApiRequest::post(self.client.login_path()).json(serde_json::to_value(params)?);
        let data = self.client.send_without_refresh(&request).await?;
        let pair: TokenPair = serde_json::from_value(data)?;

        self.client
            .credentials()
            .set_credentials(&pair.access_token, &pair.refresh_token);
        self.client
            .session()
            .set_user(UserInfo::new(params.identifier.clone()));
        tracing::info!(identifier = %params.identifier, "logged in");
        Ok(pair)
    }
}
