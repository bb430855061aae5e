//! Category and brand listings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use freshcart_core::{Brand, Category};

use super::Nav;
use crate::state::AppState;

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub nav: Nav,
    pub categories: Vec<Category>,
    pub error: Option<String>,
}

/// Brand listing template.
#[derive(Template, WebTemplate)]
#[template(path = "brands.html")]
pub struct BrandsTemplate {
    pub nav: Nav,
    pub brands: Vec<Brand>,
    pub error: Option<String>,
}

/// Display all categories.
#[instrument(skip(state, nav))]
pub async fn categories(State(state): State<AppState>, nav: Nav) -> impl IntoResponse {
    let (categories, error) = match state.api().categories().await {
        Ok(categories) => (categories, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load categories");
            (Vec::new(), Some(e.user_message()))
        }
    };

    CategoriesTemplate {
        nav,
        categories,
        error,
    }
}

/// Display all brands.
#[instrument(skip(state, nav))]
pub async fn brands(State(state): State<AppState>, nav: Nav) -> impl IntoResponse {
    let (brands, error) = match state.api().brands().await {
        Ok(brands) => (brands, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load brands");
            (Vec::new(), Some(e.user_message()))
        }
    };

    BrandsTemplate { nav, brands, error }
}
