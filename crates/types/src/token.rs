//! Credential pair and login payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An access/refresh credential pair as held by a [`crate::CredentialStore`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// The `data` payload of a login or refresh response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime hint from the server; opaque to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<serde_json::Value>,
}

impl TokenPair {
    #[must_use]
    pub fn into_credentials(self) -> Credentials {
        Credentials::new(self.access_token, self.refresh_token)
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// How the login identifier should be interpreted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LoginType {
    Email,
    Phone,
    #[default]
    Account,
}

impl From<LoginType> for u8 {
    fn from(t: LoginType) -> Self {
        match t {
            LoginType::Email => 0,
            LoginType::Phone => 1,
            LoginType::Account => 2,
        }
    }
}

impl TryFrom<u8> for LoginType {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Email),
            1 => Ok(Self::Phone),
            2 => Ok(Self::Account),
            other => Err(format!("unknown login type: {other}")),
        }
    }
}

impl std::str::FromStr for LoginType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "account" => Ok(Self::Account),
            other => Err(format!("unknown login type: {other}")),
        }
    }
}

/// Body of the login request.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    pub login_type: LoginType,
    /// One-time code for phone logins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl LoginParams {
    /// Account/password login.
    pub fn account(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            credential: Some(password.into()),
            login_type: LoginType::Account,
            code: None,
        }
    }
}

impl fmt::Debug for LoginParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginParams")
            .field("identifier", &self.identifier)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("login_type", &self.login_type)
            .field("code", &self.code.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The authenticated user as tracked by a [`crate::SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserInfo {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: None,
        }
    }
}
