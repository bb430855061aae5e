//! Per-visitor state: the session token and the cart/wishlist proxies.
//!
//! # Architecture
//!
//! - [`SessionStore`] is built once per request from the loaded session
//!   record and is the only owner of the token
//! - [`CartProxy`] and [`WishlistProxy`] take a snapshot of that token when
//!   they are built and attach it to every remote call
//! - [`CartCounts`] holds the displayed cart count per visitor, in memory
//!   only; it is written exclusively from confirmed remote responses

mod cart;
mod counter;
mod session;
mod wishlist;

pub use cart::CartProxy;
pub use counter::CartCounts;
pub use session::SessionStore;
pub use wishlist::{WishlistChange, WishlistProxy};

use thiserror::Error;

/// Errors from the durable session record.
#[derive(Debug, Error)]
#[error("Session store error: {0}")]
pub struct SessionError(#[from] pub tower_sessions::session::Error);
