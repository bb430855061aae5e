//! Client for the remote e-commerce REST API.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; every response is a loosely shaped envelope
//!   whose `status`/`statusMsg`/`message` fields decide success (see
//!   [`envelope`])
//! - The remote service is the source of truth for carts and wishlists, which
//!   are never cached
//! - Catalog reads are cached in-memory via `moka`
//!
//! # Example
//!
//! ```rust,ignore
//! use freshcart_storefront::api::EcommerceClient;
//!
//! let client = EcommerceClient::new(&config.api);
//! let page = client.products(1).await?;
//! let ack = client.add_to_cart(&token, &page.products[0].id).await?;
//! ```

mod cache;
mod client;
pub mod envelope;
pub mod types;

pub use client::{EcommerceClient, TOKEN_HEADER};
pub use types::{CartAck, CartReply, ProductPage};

use thiserror::Error;

/// Generic message for failures that carry no usable server message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Message shown when the remote service cannot be reached.
pub const TRANSPORT_FAILURE: &str =
    "We couldn't reach the store right now. Check your connection and try again.";

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response was read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The envelope reported failure.
    #[error("Rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Sign-in succeeded but no usable token came back.
    #[error("Response did not contain a session token")]
    MissingToken,

    /// Request URL could not be built, or a returned URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The service returned a redirect target that is not a web address.
    #[error("Refusing to redirect to a {0} URL")]
    UnsafeRedirect(String),
}

impl ApiError {
    /// Message safe to show the visitor.
    ///
    /// Rejections surface the service's own message when it sent one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => TRANSPORT_FAILURE.to_string(),
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::NotFound(what) => format!("{what} could not be found."),
            Self::Parse(_)
            | Self::Rejected { message: None, .. }
            | Self::MissingToken
            | Self::InvalidUrl(_)
            | Self::UnsafeRedirect(_) => GENERIC_FAILURE.to_string(),
        }
    }

    /// Whether the service rejected the token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }

    /// Whether the service reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Rejected { status: 404, .. })
    }

    /// Whether this is a fault on our side or the transport, as opposed to an
    /// ordinary rejection the visitor can act on.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Parse(_)
                | Self::MissingToken
                | Self::InvalidUrl(_)
                | Self::UnsafeRedirect(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_prefers_service_message() {
        let err = ApiError::Rejected {
            status: 401,
            message: Some("Incorrect email or password".to_string()),
        };
        assert_eq!(err.user_message(), "Incorrect email or password");
        assert!(err.is_unauthorized());
        assert!(!err.is_server_fault());
    }

    #[test]
    fn test_rejection_without_message_falls_back() {
        let err = ApiError::Rejected {
            status: 400,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_not_found_detection() {
        assert!(ApiError::NotFound("Product".to_string()).is_not_found());
        assert!(
            ApiError::Rejected {
                status: 404,
                message: None
            }
            .is_not_found()
        );
        assert!(!ApiError::MissingToken.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Rejected {
            status: 400,
            message: Some("fail".to_string()),
        };
        assert_eq!(err.to_string(), "Rejected (400): fail");
    }
}
