//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use freshcart_core::{PageMetadata, Product, ProductId};

use super::{Nav, NotFoundTemplate};
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub page: Option<u32>,
    /// Case-insensitive title filter applied to the fetched page.
    pub q: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: Nav,
    pub products: Vec<Product>,
    pub metadata: PageMetadata,
    pub query: String,
    pub error: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: Nav,
    pub product: Product,
}

/// Keep the products whose title contains `query`.
fn filter_by_title(products: Vec<Product>, query: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.matches_title(query))
        .collect()
}

/// Display product listing page.
#[instrument(skip(state, nav))]
pub async fn index(
    State(state): State<AppState>,
    nav: Nav,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or(1).max(1);
    let search = query.q.unwrap_or_default().trim().to_string();

    match state.api().products(page).await {
        Ok(listing) => ProductsIndexTemplate {
            nav,
            products: filter_by_title(listing.products, &search),
            metadata: listing.metadata,
            query: search,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, page, "Failed to load products");
            ProductsIndexTemplate {
                nav,
                products: Vec::new(),
                metadata: PageMetadata::single(0),
                query: search,
                error: Some(e.user_message()),
            }
        }
    }
}

/// Display product detail page.
#[instrument(skip(state, nav))]
pub async fn show(
    State(state): State<AppState>,
    nav: Nav,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    match state.api().product(&id).await {
        Ok(product) => Ok(ProductShowTemplate { nav, product }.into_response()),
        Err(e) if e.is_not_found() => {
            Ok((StatusCode::NOT_FOUND, NotFoundTemplate { nav }).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use freshcart_core::Price;

    use super::*;

    fn product(id: &str, title: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
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
    fn test_filter_by_title() {
        let products = vec![
            product("1", "Woman Shawl"),
            product("2", "Men's Sneakers"),
            product("3", "Shawl Pin"),
        ];

        let ids: Vec<_> = filter_by_title(products.clone(), "shawl")
            .into_iter()
            .map(|p| p.id.into_inner())
            .collect();
        assert_eq!(ids, ["1", "3"]);

        assert_eq!(filter_by_title(products, "").len(), 3);
    }
}
