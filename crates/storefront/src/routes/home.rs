//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use freshcart_core::{Category, Product};

use super::Nav;
use crate::filters;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub error: Option<String>,
}

/// Display the home page.
///
/// Category strip plus the first page of products. Either section failing
/// leaves it empty and shows an inline alert.
#[instrument(skip(state, nav))]
pub async fn home(State(state): State<AppState>, nav: Nav) -> impl IntoResponse {
    let (categories, products) = tokio::join!(state.api().categories(), state.api().products(1));

    let mut error = None;
    let categories = categories.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories");
        error = Some(e.user_message());
        Vec::new()
    });
    let products = products.map(|page| page.products).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load products");
        error = Some(e.user_message());
        Vec::new()
    });

    HomeTemplate {
        nav,
        categories,
        products,
        error,
    }
}
