//! Turns every transport outcome into a success payload or a classified error.
//!
//! Rules, in order:
//! 1. `401` is an authentication failure, whatever the body says.
//! 2. A 2xx with `errorCode != 0` is a business failure.
//! 3. Any other non-2xx is a transport failure.
//! 4. Otherwise the envelope's `data` is the result.
//!
//! Bodies that do not decode as an envelope never escape as decode errors;
//! they fall back to a generic message in the same error kind.

use scribe_types::{
    ApiEnvelope, ApiError, StatusCode, TransportResponse, error::GENERIC_BUSINESS_MESSAGE,
    traits::Result,
};
use serde_json::Value;

/// Message used when a 2xx body is not an envelope.
pub const MALFORMED_BODY_MESSAGE: &str = "malformed response body";

/// Generic message for a failed status whose body carries no description.
#[must_use]
pub fn http_error_message(status: StatusCode) -> String {
    format!("HTTP Error {}", status.as_u16())
}

/// Classifies one response. Never retries, never panics.
///
/// # Errors
///
/// Returns the [`ApiError`] describing why the call did not succeed.
pub fn classify(response: &TransportResponse) -> Result<Value> {
    let status = response.status;
    let envelope = ApiEnvelope::from_slice(&response.body);
    let described = |fallback: String| {
        envelope
            .as_ref()
            .and_then(ApiEnvelope::description)
            .map_or(fallback, str::to_string)
    };

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Authentication {
            status: status.as_u16(),
            message: described(http_error_message(status)),
        });
    }

    if !status.is_success() {
        return Err(ApiError::Transport {
            status: Some(status.as_u16()),
            message: described(http_error_message(status)),
        });
    }

    match envelope {
        Some(env) if env.is_success() => Ok(env.data),
        Some(env) => Err(ApiError::Business {
            code: env.error_code,
            message: env
                .description()
                .unwrap_or(GENERIC_BUSINESS_MESSAGE)
                .to_string(),
        }),
        // 204 and friends: nothing to unwrap.
        None if response.body.iter().all(u8::is_ascii_whitespace) => Ok(Value::Null),
        None => Err(ApiError::Transport {
            status: Some(status.as_u16()),
            message: MALFORMED_BODY_MESSAGE.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_types::ErrorKind;
    use serde_json::json;

    fn json_resp(status: u16, body: &Value) -> TransportResponse {
        TransportResponse::json(StatusCode::from_u16(status).unwrap(), body)
    }

    fn raw_resp(status: u16, body: &'static str) -> TransportResponse {
        TransportResponse::new(StatusCode::from_u16(status).unwrap(), body)
    }

    #[test]
    fn test_success_unwraps_data() {
        let resp = json_resp(200, &json!({"errorCode": 0, "errorDesc": "", "data": {"id": "1"}}));
        assert_eq!(classify(&resp).unwrap(), json!({"id": "1"}));
    }

    #[test]
    fn test_success_for_whole_2xx_range() {
        for status in [200, 201, 202, 299] {
            let resp = json_resp(status, &json!({"errorCode": 0, "data": [1, 2]}));
            assert_eq!(classify(&resp).unwrap(), json!([1, 2]), "status {status}");
        }
    }

    #[test]
    fn test_business_error() {
        let resp = json_resp(
            200,
            &json!({"errorCode": 4001, "errorDesc": "not found", "data": null}),
        );
        assert_eq!(
            classify(&resp).unwrap_err(),
            ApiError::Business {
                code: 4001,
                message: "not found".into()
            }
        );
    }

    #[test]
    fn test_business_error_without_description() {
        let resp = json_resp(200, &json!({"errorCode": 5, "errorDesc": "", "data": null}));
        let err = classify(&resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.code(), 5);
        assert_eq!(err.message(), GENERIC_BUSINESS_MESSAGE);
    }

    #[test]
    fn test_401_is_authentication_error() {
        let err = classify(&raw_resp(401, "")).unwrap_err();
        assert_eq!(
            err,
            ApiError::Authentication {
                status: 401,
                message: "HTTP Error 401".into()
            }
        );
    }

    #[test]
    fn test_401_uses_envelope_description() {
        let resp = json_resp(401, &json!({"errorCode": 401, "errorDesc": "token expired"}));
        assert_eq!(classify(&resp).unwrap_err().message(), "token expired");
    }

    #[test]
    fn test_non_2xx_with_envelope() {
        let resp = json_resp(
            403,
            &json!({"errorCode": 403, "errorDesc": "forbidden", "data": null}),
        );
        assert_eq!(
            classify(&resp).unwrap_err(),
            ApiError::Transport {
                status: Some(403),
                message: "forbidden".into()
            }
        );
    }

    #[test]
    fn test_non_2xx_without_envelope() {
        let err = classify(&raw_resp(502, "<html>Bad Gateway</html>")).unwrap_err();
        assert_eq!(
            err,
            ApiError::Transport {
                status: Some(502),
                message: "HTTP Error 502".into()
            }
        );
        assert_eq!(err.code(), 502);
    }

    #[test]
    fn test_non_2xx_with_zero_error_code_is_still_failure() {
        let resp = json_resp(500, &json!({"errorCode": 0, "errorDesc": "", "data": {}}));
        let err = classify(&resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.message(), "HTTP Error 500");
    }

    #[test]
    fn test_malformed_2xx_body() {
        let err = classify(&raw_resp(200, "not json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.code(), 200);
        assert_eq!(err.message(), MALFORMED_BODY_MESSAGE);
    }

    #[test]
    fn test_empty_2xx_body_is_null_data() {
        assert_eq!(classify(&raw_resp(204, "")).unwrap(), Value::Null);
        assert_eq!(classify(&raw_resp(200, " \n")).unwrap(), Value::Null);
    }
}
