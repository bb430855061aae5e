//! Cart route handlers.
//!
//! Cart mutations use HTMX for dynamic updates without full page reloads.
//! The displayed count changes only when the remote service confirms a
//! mutation; failures leave it untouched and surface as a toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use freshcart_core::{CartLine, CartState, ProductId};

use super::{AlertQuery, Nav, ProductForm, back_to};
use crate::api::ApiError;
use crate::error::add_breadcrumb;
use crate::htmx::{self, HxRequest, HxTrigger, Toast};
use crate::middleware::Authenticated;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub title: String,
    pub image: String,
    pub quantity: i64,
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub cart_id: Option<String>,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Whether to render the "cart is empty" state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.to_string(),
            title: line.product.title.clone(),
            image: line.product.image_cover.clone(),
            quantity: i64::from(line.quantity),
            unit_price: line.unit_price.to_string(),
            line_total: line.line_total().to_string(),
        }
    }
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            cart_id: cart.cart_id.as_ref().map(ToString::to_string),
            lines: cart.items.iter().map(CartLineView::from).collect(),
            total: cart.total_price.to_string(),
            item_count: cart.item_count,
        }
    }
}

/// Update cart form data.
///
/// `count` is signed: zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub count: i64,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Nav,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: Option<u32>,
}

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    auth: Authenticated,
    nav: Nav,
    Query(alert): Query<AlertQuery>,
) -> impl IntoResponse {
    let (cart, error) = match state.cart(auth.token).list().await {
        Ok(cart) => (CartView::from(&cart), alert.error),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart");
            (CartView::from(&CartState::empty()), Some(e.user_message()))
        }
    };

    CartShowTemplate { nav, cart, error }
}

/// Add item to cart (HTMX).
///
/// On success the badge shows the count the service reported, or the last
/// known count when the reply carried none.
#[instrument(skip(state, auth, hx))]
pub async fn add(
    State(state): State<AppState>,
    auth: Authenticated,
    hx: HxRequest,
    Form(form): Form<ProductForm>,
) -> Response {
    let cart = state.cart(auth.token);
    match cart.add(&form.product_id).await {
        Ok(ack) => {
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", form.product_id.as_str())]),
            );
            if !hx.0 {
                return back_to("/cart", None);
            }
            let count = match ack.item_count {
                Some(count) => Some(count),
                None => cart.count().await.ok(),
            };
            let message = ack
                .message
                .unwrap_or_else(|| "Product added to your cart".to_string());
            (
                HxTrigger::toast(Toast::success(message)).cart_updated(),
                CartCountTemplate { count },
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add item to cart");
            if !hx.0 {
                return back_to("/cart", Some(&e.user_message()));
            }
            htmx::toast_only(Toast::error(e.user_message()))
        }
    }
}

/// Update cart item quantity (HTMX).
///
/// A count of zero or less removes the line.
#[instrument(skip(state, auth, hx))]
pub async fn update(
    State(state): State<AppState>,
    auth: Authenticated,
    hx: HxRequest,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let result = state
        .cart(auth.token)
        .update_quantity(&form.product_id, form.count)
        .await;
    cart_fragment(result, hx)
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, auth, hx))]
pub async fn remove(
    State(state): State<AppState>,
    auth: Authenticated,
    hx: HxRequest,
    Form(form): Form<ProductForm>,
) -> Response {
    let result = state.cart(auth.token).remove(&form.product_id).await;
    cart_fragment(result, hx)
}

/// Empty the cart (HTMX).
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    auth: Authenticated,
    hx: HxRequest,
) -> Response {
    let result = state
        .cart(auth.token)
        .clear()
        .await
        .map(|()| CartState::empty());
    cart_fragment(result, hx)
}

/// Get cart count badge (HTMX).
#[instrument(skip_all)]
pub async fn count(State(state): State<AppState>, auth: Authenticated) -> impl IntoResponse {
    let count = state
        .cart(auth.token)
        .count()
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load cart count"))
        .ok();

    CartCountTemplate { count }
}

// =============================================================================
// Helpers
// =============================================================================

/// Render the outcome of a cart mutation.
///
/// A failed mutation only raises a toast: the fragment on the page and the
/// count badge both stay as they were.
fn cart_fragment(result: Result<CartState, ApiError>, hx: HxRequest) -> Response {
    let cart = match result {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!(error = %e, "Cart mutation failed");
            if !hx.0 {
                return back_to("/cart", Some(&e.user_message()));
            }
            return htmx::toast_only(Toast::error(e.user_message()));
        }
    };

    if !hx.0 {
        return back_to("/cart", None);
    }

    let toast = Toast::success(if cart.is_empty() {
        "Your cart is empty"
    } else {
        "Cart updated"
    });
    (
        HxTrigger::toast(toast).cart_updated(),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}
