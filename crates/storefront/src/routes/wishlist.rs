//! Wishlist route handlers.
//!
//! Removal refetches the whole wishlist, so the fragment always shows the
//! service's view rather than a locally patched list. Adding to the wishlist,
//! or from it to the cart, only raises a toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use freshcart_core::{Product, WishlistState};

use super::{AlertQuery, Nav, ProductForm, back_to};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::htmx::{self, HxRequest, HxTrigger, Toast};
use crate::middleware::Authenticated;
use crate::state::AppState;

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub nav: Nav,
    pub products: Vec<Product>,
    pub error: Option<String>,
}

/// Wishlist items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_items.html")]
pub struct WishlistItemsTemplate {
    pub products: Vec<Product>,
}

impl From<WishlistState> for WishlistItemsTemplate {
    fn from(wishlist: WishlistState) -> Self {
        Self {
            products: wishlist.items().to_vec(),
        }
    }
}

/// Display wishlist page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    auth: Authenticated,
    nav: Nav,
    Query(alert): Query<AlertQuery>,
) -> impl IntoResponse {
    let (products, error) = match state.wishlist(auth.token).list().await {
        Ok(wishlist) => (wishlist.items().to_vec(), alert.error),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch wishlist");
            (Vec::new(), Some(e.user_message()))
        }
    };

    WishlistShowTemplate {
        nav,
        products,
        error,
    }
}

/// Add product to wishlist (HTMX).
///
/// Nothing on the calling page is swapped; the outcome is a toast.
#[instrument(skip(state, auth, hx))]
pub async fn add(
    State(state): State<AppState>,
    auth: Authenticated,
    hx: HxRequest,
    Form(form): Form<ProductForm>,
) -> Response {
    match state.wishlist(auth.token).add(&form.product_id).await {
        Ok(message) => {
            add_breadcrumb(
                "wishlist",
                "Added to wishlist",
                Some(&[("product_id", form.product_id.as_str())]),
            );
            if !hx.0 {
                return back_to("/wishlist", None);
            }
            let message = message.unwrap_or_else(|| "Product added to your wishlist".to_string());
            (StatusCode::NO_CONTENT, HxTrigger::toast(Toast::success(message))).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add item to wishlist");
            if !hx.0 {
                return back_to("/wishlist", Some(&e.user_message()));
            }
            (
                StatusCode::NO_CONTENT,
                HxTrigger::toast(Toast::error(e.user_message())),
            )
                .into_response()
        }
    }
}

/// Remove product from wishlist (HTMX).
#[instrument(skip(state, auth, hx))]
pub async fn remove(
    State(state): State<AppState>,
    auth: Authenticated,
    hx: HxRequest,
    Form(form): Form<ProductForm>,
) -> Response {
    match state.wishlist(auth.token).remove(&form.product_id).await {
        Ok(change) => {
            if !hx.0 {
                return back_to("/wishlist", None);
            }
            let message = change
                .message
                .unwrap_or_else(|| "Product removed from your wishlist".to_string());
            (
                HxTrigger::toast(Toast::success(message)),
                WishlistItemsTemplate::from(change.wishlist),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to remove item from wishlist");
            failure(hx, &e.user_message())
        }
    }
}

/// Add a wishlisted product to the cart.
///
/// The wishlist itself is left as it is.
#[instrument(skip(state, auth, hx))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    auth: Authenticated,
    hx: HxRequest,
    Form(form): Form<ProductForm>,
) -> Response {
    match state.cart(auth.token).add(&form.product_id).await {
        Ok(ack) => {
            add_breadcrumb(
                "wishlist",
                "Added wishlist item to cart",
                Some(&[("product_id", form.product_id.as_str())]),
            );
            if !hx.0 {
                return back_to("/wishlist", None);
            }
            let message = ack
                .message
                .unwrap_or_else(|| "Product added to your cart".to_string());
            (
                StatusCode::NO_CONTENT,
                HxTrigger::toast(Toast::success(message)).cart_updated(),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add wishlist item to cart");
            failure(hx, &e.user_message())
        }
    }
}

fn failure(hx: HxRequest, message: &str) -> Response {
    if !hx.0 {
        return back_to("/wishlist", Some(message));
    }
    htmx::toast_only(Toast::error(message.to_string()))
}
