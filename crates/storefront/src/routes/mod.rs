//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog (requires auth)
//! GET  /                           - Home page (categories + first product page)
//! GET  /products?page=N&q=         - Product listing with title filter
//! GET  /products/{id}              - Product detail
//! GET  /categories                 - Category listing
//! GET  /brands                     - Brand listing
//!
//! # Cart (requires auth, HTMX fragments)
//! GET  /cart                       - Cart page
//! POST /cart/add                   - Add to cart (toast, triggers cart-updated)
//! POST /cart/update                - Set quantity (returns cart_items fragment)
//! POST /cart/remove                - Remove line (returns cart_items fragment)
//! POST /cart/clear                 - Empty cart (returns cart_items fragment)
//! GET  /cart/count                 - Cart count badge (fragment)
//!
//! # Wishlist (requires auth, HTMX fragments)
//! GET  /wishlist                   - Wishlist page
//! POST /wishlist/add               - Add to wishlist (toast)
//! POST /wishlist/remove            - Remove (returns wishlist_items fragment)
//! POST /wishlist/add-to-cart       - Add to cart; wishlist untouched (toast)
//!
//! # Checkout (requires auth)
//! GET  /checkout/{cart_id}         - Shipping form
//! POST /checkout/{cart_id}         - Redirect to the hosted payment page
//!
//! # Auth
//! GET  /login                      - Login page
//! POST /login                      - Login action
//! GET  /register                   - Register page
//! POST /register                   - Register action
//! POST /logout                     - Logout action
//! GET  /forgot-password            - Request a reset code
//! POST /forgot-password            - Send the reset code
//! POST /forgot-password/verify     - Check the reset code
//! GET  /reset-password             - New password form
//! POST /reset-password             - Set the new password
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod home;
pub mod products;
pub mod wishlist;

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;

use freshcart_core::ProductId;

use crate::middleware::require_session;
use crate::state::AppState;
use crate::store::SessionStore;

// =============================================================================
// Shared View Data
// =============================================================================

/// Navigation bar state rendered by every full page.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub signed_in: bool,
    /// `None` when the count could not be determined; the badge is hidden.
    pub cart_count: Option<u32>,
}

impl FromRequestParts<AppState> for Nav {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .extensions
            .get::<SessionStore>()
            .and_then(SessionStore::token);

        let Some(token) = token else {
            return Ok(Self::default());
        };

        let cart_count = state
            .cart(token)
            .count()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to load cart count"))
            .ok();

        Ok(Self {
            signed_in: true,
            cart_count,
        })
    }
}

/// Form body naming a single product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: ProductId,
}

/// Redirect a non-HTMX form post back to `path`, carrying an error for the
/// page's inline alert.
#[must_use]
pub fn back_to(path: &str, error: Option<&str>) -> Response {
    match error {
        Some(message) => {
            let encoded: String =
                url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
            Redirect::to(&format!("{path}?error={encoded}")).into_response()
        }
        None => Redirect::to(path).into_response(),
    }
}

/// Query carrying an error to show inline after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    pub error: Option<String>,
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub nav: Nav,
}

/// Fallback for unknown routes.
pub async fn not_found(nav: Nav) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { nav }).into_response()
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router (public).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route("/forgot-password/verify", post(auth::verify_reset_code))
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(catalog::categories))
        .route("/brands", get(catalog::brands))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/clear", post(cart::clear))
        .route("/cart/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/add", post(wishlist::add))
        .route("/wishlist/remove", post(wishlist::remove))
        .route("/wishlist/add-to-cart", post(wishlist::add_to_cart))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route(
        "/checkout/{cart_id}",
        get(checkout::show).post(checkout::submit),
    )
}

/// Every route that needs a signed-in visitor, behind the route guard.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(wishlist_routes())
        .merge(checkout_routes())
        .route_layer(middleware::from_fn(require_session))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(protected_routes())
        .merge(auth_routes())
        .fallback(not_found)
}
