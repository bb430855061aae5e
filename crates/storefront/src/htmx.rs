//! HTMX request detection and response headers.
//!
//! Transient notifications ("toasts") travel in the `HX-Trigger` response
//! header as a `toast` event; `static/app.js` renders them. The same header
//! carries `cart-updated`, which makes the navigation badge refetch
//! `/cart/count`.

use std::convert::Infallible;
use std::fmt::Write;

use axum::{
    extract::FromRequestParts,
    http::{HeaderName, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, IntoResponseParts, Response, ResponseParts},
};
use serde::Serialize;
use serde_json::{Map, Value};

const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");
const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");
const HX_RESWAP: HeaderName = HeaderName::from_static("hx-reswap");

/// Event that refreshes the cart badge.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Event that shows a toast.
pub const TOAST_EVENT: &str = "toast";

/// Whether the request was issued by HTMX (`HX-Request: true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(is_htmx(parts.headers.get("HX-Request"))))
    }
}

/// Interpret an `HX-Request` header value.
#[must_use]
pub fn is_htmx(header: Option<&HeaderValue>) -> bool {
    header.is_some_and(|v| v.as_bytes() == b"true")
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Builder for the `HX-Trigger` response header.
#[derive(Debug, Clone, Default)]
pub struct HxTrigger(Map<String, Value>);

impl HxTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger only a toast.
    #[must_use]
    pub fn toast(toast: Toast) -> Self {
        Self::new().with_toast(toast)
    }

    #[must_use]
    pub fn with_toast(mut self, toast: Toast) -> Self {
        let value = serde_json::to_value(toast).unwrap_or(Value::Null);
        self.0.insert(TOAST_EVENT.to_string(), value);
        self
    }

    #[must_use]
    pub fn cart_updated(mut self) -> Self {
        self.0.insert(CART_UPDATED_EVENT.to_string(), Value::Null);
        self
    }

    /// The header value, or `None` when no event was added.
    #[must_use]
    pub fn header_value(&self) -> Option<HeaderValue> {
        if self.0.is_empty() {
            return None;
        }
        HeaderValue::from_str(&ascii_json(&Value::Object(self.0.clone()))).ok()
    }
}

/// Serialize `value` with every non-ASCII character `\u`-escaped.
///
/// Header values reach the browser as Latin-1, so raw UTF-8 in a service
/// message would arrive garbled.
fn ascii_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{unit:04x}");
            }
        }
    }
    out
}

impl IntoResponseParts for HxTrigger {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.header_value() {
            res.headers_mut().insert(HX_TRIGGER, value);
        }
        Ok(res)
    }
}

/// The trigger header alone, with an empty body.
impl IntoResponse for HxTrigger {
    fn into_response(self) -> Response {
        (self, ()).into_response()
    }
}

/// Navigate the browser to `to`.
///
/// HTMX requests get `HX-Redirect` so the whole page changes rather than the
/// swap target; plain requests get `303 See Other`. A target that cannot be
/// sent as a header value is refused with `502 Bad Gateway`.
#[must_use]
pub fn redirect(hx: HxRequest, to: &str) -> Response {
    let Ok(location) = HeaderValue::from_str(to) else {
        tracing::warn!(target_len = to.len(), "Refusing redirect to an invalid header value");
        return StatusCode::BAD_GATEWAY.into_response();
    };

    if hx.0 {
        (StatusCode::OK, [(HX_REDIRECT, location)]).into_response()
    } else {
        (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
    }
}

/// A toast with nothing to swap: the target keeps its current content.
#[must_use]
pub fn toast_only(toast: Toast) -> Response {
    (
        StatusCode::OK,
        [(HX_RESWAP, HeaderValue::from_static("none"))],
        HxTrigger::toast(toast),
    )
        .into_response()
}
