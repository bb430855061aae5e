//! Cart and wishlist snapshots.
//!
//! Both are always built from a remote response and replaced wholesale; no
//! method here patches a snapshot in place.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartId, Price, Product, ProductId, ProductSummary};

/// A line in the shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: ProductSummary,
    pub quantity: u32,
    pub unit_price: Price,
}

impl CartLine {
    /// Quantity times unit price, for display next to the line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::new(
            self.unit_price.amount * Decimal::from(self.quantity),
            self.unit_price.currency_code,
        )
    }
}

/// The visitor's cart as last reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    /// Remote cart document ID, needed to open a checkout session.
    pub cart_id: Option<CartId>,
    /// Server-reported item count (`numOfCartItems`).
    pub item_count: u32,
    pub items: Vec<CartLine>,
    /// Server-reported total (`totalCartPrice`).
    pub total_price: Price,
}

impl CartState {
    /// A cart with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            cart_id: None,
            item_count: 0,
            items: Vec::new(),
            total_price: Price::zero(),
        }
    }

    /// Whether the cart should be presented as empty.
    ///
    /// Decided by the item set, not the count: a response with zero lines is
    /// an empty cart even if the remote document still exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::empty()
    }
}

/// The visitor's wishlist as last reported by the remote service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WishlistState {
    items: Vec<Product>,
}

impl WishlistState {
    /// Build from a remote listing, keeping the first occurrence of each
    /// product ID.
    #[must_use]
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut seen = HashSet::new();
        let items = products
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.items.iter().any(|p| &p.id == product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str) -> ProductSummary {
        ProductSummary {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_cover: String::new(),
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            description: String::new(),
            price: Price::egp(Decimal::new(100, 0)),
            price_after_discount: None,
            image_cover: String::new(),
            images: Vec::new(),
            ratings_average: 0.0,
            ratings_quantity: 0,
            category: None,
            brand: None,
        }
    }

    #[test]
    fn test_line_total() {
        let line = CartLine {
            product: summary("p1"),
            quantity: 3,
            unit_price: Price::egp(Decimal::new(1_250, 2)),
        };
        assert_eq!(line.line_total(), Price::egp(Decimal::new(3_750, 2)));
    }

    #[test]
    fn test_empty_cart_is_empty_even_with_document_id() {
        let cart = CartState {
            cart_id: Some(CartId::new("c1")),
            ..CartState::empty()
        };
        assert!(cart.is_empty());
    }

    #[test]
    fn test_wishlist_dedupes_by_product_id() {
        let wishlist = WishlistState::from_products([product("a"), product("b"), product("a")]);
        assert_eq!(wishlist.len(), 2);
        assert!(wishlist.contains(&ProductId::new("a")));
        assert!(wishlist.contains(&ProductId::new("b")));
        assert!(!wishlist.contains(&ProductId::new("c")));
    }

    #[test]
    fn test_wishlist_keeps_first_occurrence_order() {
        let wishlist = WishlistState::from_products([product("b"), product("a"), product("b")]);
        let ids: Vec<_> = wishlist.items().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }
}
