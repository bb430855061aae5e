//! Catalog entities as rendered by the storefront.
//!
//! These are the decoded subset of the remote service's documents. Anything
//! the storefront does not render is dropped during conversion.

use serde::{Deserialize, Serialize};

use super::{BrandId, CategoryId, Price, ProductId};

/// A product with everything the listing and detail pages need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Price,
    /// Discounted price, when the product is on sale.
    pub price_after_discount: Option<Price>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub ratings_average: f64,
    pub ratings_quantity: u32,
    pub category: Option<Category>,
    pub brand: Option<Brand>,
}

impl Product {
    /// Case-insensitive substring match on the title.
    ///
    /// An empty (or all-whitespace) query matches every product.
    #[must_use]
    pub fn matches_title(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.title.to_lowercase().contains(&query.to_lowercase())
    }

    /// The price a shopper pays today.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.price_after_discount.unwrap_or(self.price)
    }

    /// Reduce to the fields cart lines and wishlist entries render.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            image_cover: self.image_cover.clone(),
        }
    }
}

/// Minimal product reference embedded in cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub title: String,
    pub image_cover: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub image: String,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: String,
    pub image: String,
}

/// Pagination metadata for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub current_page: u32,
    pub number_of_pages: u32,
    pub limit: u32,
}

impl PageMetadata {
    /// Metadata for a single, complete page.
    #[must_use]
    pub const fn single(limit: u32) -> Self {
        Self {
            current_page: 1,
            number_of_pages: 1,
            limit,
        }
    }

    /// Previous page number, if any.
    #[must_use]
    pub const fn prev_page(&self) -> Option<u32> {
        if self.current_page > 1 {
            Some(self.current_page - 1)
        } else {
            None
        }
    }

    /// Next page number, if any.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        if self.current_page < self.number_of_pages {
            Some(self.current_page + 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(title: &str) -> Product {
        Product {
            id: ProductId::new("p1"),
            title: title.to_string(),
            description: String::new(),
            price: Price::egp(Decimal::new(200, 0)),
            price_after_discount: None,
            image_cover: String::new(),
            images: Vec::new(),
            ratings_average: 4.5,
            ratings_quantity: 10,
            category: None,
            brand: None,
        }
    }

    #[test]
    fn test_matches_title_is_case_insensitive() {
        let p = product("Woman Shawl");
        assert!(p.matches_title("shawl"));
        assert!(p.matches_title("WOMAN"));
        assert!(!p.matches_title("laptop"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(product("Anything").matches_title(""));
        assert!(product("Anything").matches_title("   "));
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        let mut p = product("Shawl");
        assert_eq!(p.effective_price(), Price::egp(Decimal::new(200, 0)));

        p.price_after_discount = Some(Price::egp(Decimal::new(150, 0)));
        assert_eq!(p.effective_price(), Price::egp(Decimal::new(150, 0)));
    }

    #[test]
    fn test_page_navigation() {
        let meta = PageMetadata {
            current_page: 2,
            number_of_pages: 3,
            limit: 40,
        };
        assert_eq!(meta.prev_page(), Some(1));
        assert_eq!(meta.next_page(), Some(3));

        let single = PageMetadata::single(40);
        assert_eq!(single.prev_page(), None);
        assert_eq!(single.next_page(), None);
    }
}
