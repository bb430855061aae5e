//! FreshCart Core - Shared domain types.
//!
//! This crate provides the types used by the storefront binary:
//! - [`types`] - Newtype IDs, prices, emails, and catalog entities
//! - [`cart`] - Cart and wishlist snapshots as reported by the remote service
//! - [`route`] - The route table and the access-control decision
//! - [`validation`] - Form rules checked before any remote call
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! sessions, no HTTP clients. Everything here can be unit tested without a
//! runtime.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod route;
pub mod types;
pub mod validation;

pub use cart::{CartLine, CartState, WishlistState};
pub use route::{GuardDecision, Route, guard};
pub use types::*;
pub use validation::{
    Credentials, FieldErrors, ForgotPasswordInput, PasswordReset, Registration, ResetCodeInput,
    ResetPasswordInput, ShippingAddress, ShippingInput, SignInInput, SignUpInput, ValidationError,
};
