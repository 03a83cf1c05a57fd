//! The uniform `{ errorCode, errorDesc, data }` wrapper returned by the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope `errorCode` meaning application success.
pub const SUCCESS_CODE: i64 = 0;

/// A decoded API response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T = Value> {
    pub error_code: i64,
    #[serde(default)]
    pub error_desc: String,
    pub data: T,
}

impl ApiEnvelope {
    /// Decodes a raw body, returning `None` for anything that is not an envelope.
    ///
    /// A missing `data` field decodes as `null`; a missing `errorCode` does not decode.
    #[must_use]
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            error_code: i64,
            #[serde(default)]
            error_desc: Option<String>,
            #[serde(default)]
            data: Value,
        }

        let raw: Raw = serde_json::from_slice(body).ok()?;
        Some(Self {
            error_code: raw.error_code,
            error_desc: raw.error_desc.unwrap_or_default(),
            data: raw.data,
        })
    }
}

impl<T> ApiEnvelope<T> {
    /// Wraps `data` in a success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            error_code: SUCCESS_CODE,
            error_desc: String::new(),
            data,
        }
    }

    /// Returns `true` if `errorCode` signals success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_code == SUCCESS_CODE
    }

    /// Returns the description, or `None` when it is empty.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        let desc = self.error_desc.trim();
        (!desc.is_empty()).then_some(desc)
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}
