//! Core types for FreshCart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod price;

pub use catalog::{Brand, Category, PageMetadata, Product, ProductSummary};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
