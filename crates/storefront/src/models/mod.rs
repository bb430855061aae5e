//! Domain models for storefront.

pub mod session;

pub use session::{SessionToken, keys as session_keys};
