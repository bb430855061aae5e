//! Success/failure discrimination for remote responses.
//!
//! The service is inconsistent about how it reports outcomes. Depending on
//! the endpoint a response carries `status`, `statusMsg`, a bare
//! `message: "success"`, or nothing at all (catalog listings). The rules,
//! in order:
//!
//! 1. A non-2xx HTTP status is always a failure.
//! 2. If `status` or `statusMsg` is present, the call succeeded only when one
//!    of them is `"success"` (any case).
//! 3. Otherwise a bare `message` of `"fail"` or `"error"` is a failure.
//! 4. Anything else is a success.
//!
//! On failure the visitor-facing message is taken from `errors.msg`, then from
//! `message` when it is more than a marker word.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;

const SUCCESS: &str = "success";

/// Discriminator fields shared by every response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Validation detail: `{msg, param}`, or a list of them.
    #[serde(default)]
    pub errors: Option<Value>,
}

impl Envelope {
    /// Whether the envelope itself reports success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        let discriminators = [self.status.as_deref(), self.status_msg.as_deref()];
        if discriminators.iter().any(Option::is_some) {
            return discriminators
                .into_iter()
                .flatten()
                .any(|s| s.eq_ignore_ascii_case(SUCCESS));
        }

        !self.message.as_deref().is_some_and(is_failure_marker)
    }

    /// The most specific visitor-facing message, if the service sent one.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        if let Some(msg) = self.errors.as_ref().and_then(validation_message) {
            return Some(msg);
        }

        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| {
                !m.is_empty() && !is_failure_marker(m) && !m.eq_ignore_ascii_case(SUCCESS)
            })
            .map(String::from)
    }
}

fn validation_message(errors: &Value) -> Option<String> {
    let detail = match errors {
        Value::Array(items) => items.first()?,
        other => other,
    };
    detail.get("msg")?.as_str().map(String::from)
}

fn is_failure_marker(message: &str) -> bool {
    let message = message.trim();
    message.eq_ignore_ascii_case("fail") || message.eq_ignore_ascii_case("error")
}

/// Decode a response body, applying the envelope rules before the payload.
///
/// # Errors
///
/// Returns `ApiError::Rejected` when the status or envelope reports failure,
/// or `ApiError::Parse` when a successful body does not match `T`.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: None,
            });
        }
        Err(e) => return Err(ApiError::Parse(e)),
    };

    let envelope = Envelope::deserialize(&value).unwrap_or_default();

    if !status.is_success() || !envelope.is_success() {
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message: envelope.failure_message(),
        });
    }

    Ok(T::deserialize(value)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Count {
        num_of_cart_items: u32,
    }

    #[derive(Debug, Deserialize)]
    struct Anything {}

    fn envelope(json: &str) -> Envelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_status_success_wins() {
        assert!(envelope(r#"{"status":"success","message":"Product added"}"#).is_success());
        assert!(envelope(r#"{"status":"Success"}"#).is_success());
        assert!(envelope(r#"{"statusMsg":"success","message":"Reset code sent"}"#).is_success());
    }

    #[test]
    fn test_status_fail_is_failure_even_with_message() {
        assert!(!envelope(r#"{"status":"fail","message":"success"}"#).is_success());
        assert!(!envelope(r#"{"statusMsg":"fail","message":"Incorrect email"}"#).is_success());
        assert!(!envelope(r#"{"statusMsg":"error"}"#).is_success());
    }

    #[test]
    fn test_bare_message_discriminates_when_no_status() {
        assert!(envelope(r#"{"message":"success","token":"abc"}"#).is_success());
        assert!(!envelope(r#"{"message":"fail"}"#).is_success());
        assert!(!envelope(r#"{"message":"error"}"#).is_success());
    }

    #[test]
    fn test_listing_without_discriminators_is_success() {
        assert!(envelope(r#"{"results":40,"data":[]}"#).is_success());
    }

    #[test]
    fn test_failure_message_precedence() {
        let e = envelope(
            r#"{"message":"fail","errors":{"msg":"Invalid email","param":"email"}}"#,
        );
        assert_eq!(e.failure_message().as_deref(), Some("Invalid email"));

        let e = envelope(r#"{"statusMsg":"fail","message":"Incorrect email or password"}"#);
        assert_eq!(
            e.failure_message().as_deref(),
            Some("Incorrect email or password")
        );

        let e = envelope(r#"{"message":"fail","errors":[{"msg":"Too short","param":"name"}]}"#);
        assert_eq!(e.failure_message().as_deref(), Some("Too short"));

        assert_eq!(envelope(r#"{"status":"fail"}"#).failure_message(), None);
        assert_eq!(envelope(r#"{"message":"fail"}"#).failure_message(), None);
    }

    #[test]
    fn test_decode_success_payload() {
        let count: Count = decode(
            StatusCode::OK,
            r#"{"status":"success","numOfCartItems":3}"#,
        )
        .unwrap();
        assert_eq!(count.num_of_cart_items, 3);
    }

    #[test]
    fn test_decode_rejects_fail_status_with_200() {
        let err = decode::<Anything>(StatusCode::OK, r#"{"status":"fail"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 200, .. }));
    }

    #[test]
    fn test_decode_rejects_non_2xx_even_without_envelope() {
        let err = decode::<Anything>(StatusCode::BAD_GATEWAY, "<html>oops</html>").unwrap_err();
        assert!(matches!(
            err,
            ApiError::Rejected {
                status: 502,
                message: None
            }
        ));

        let err = decode::<Anything>(StatusCode::NOT_FOUND, r#"{"data":[]}"#).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decode_garbage_on_success_is_parse_error() {
        let err = decode::<Anything>(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
