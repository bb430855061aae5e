//! Cache types for catalog responses.

use freshcart_core::{Brand, Category, Product, ProductId};

use super::ProductPage;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products { page: u32 },
    Product(ProductId),
    Categories,
    Brands,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(ProductPage),
    Product(Box<Product>),
    Categories(Vec<Category>),
    Brands(Vec<Brand>),
}
