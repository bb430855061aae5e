//! Checkout route handlers.
//!
//! Collects a shipping address and hands the visitor to the remote payment
//! page. Validation happens before any remote call.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use freshcart_core::{CartId, FieldErrors, ShippingInput};

use super::Nav;
use crate::error::add_breadcrumb;
use crate::htmx::{self, HxRequest};
use crate::middleware::Authenticated;
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub nav: Nav,
    pub cart_id: String,
    pub form: ShippingInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Shipping form fragment (for HTMX re-renders).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_form.html")]
pub struct CheckoutFormTemplate {
    pub cart_id: String,
    pub form: ShippingInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Display the shipping form.
#[instrument(skip(nav))]
pub async fn show(Path(cart_id): Path<CartId>, nav: Nav) -> impl IntoResponse {
    CheckoutTemplate {
        nav,
        cart_id: cart_id.into_inner(),
        form: ShippingInput::default(),
        errors: FieldErrors::new(),
        error: None,
    }
}

/// Validate the address, open a payment session, and redirect to it.
#[instrument(skip(state, auth, nav, hx, form))]
pub async fn submit(
    State(state): State<AppState>,
    auth: Authenticated,
    nav: Nav,
    hx: HxRequest,
    Path(cart_id): Path<CartId>,
    Form(form): Form<ShippingInput>,
) -> Response {
    let address = match form.validate() {
        Ok(address) => address,
        Err(errors) => return render(hx, nav, cart_id, form, errors, None),
    };

    let return_url = &state.config().base_url;
    match state
        .cart(auth.token)
        .checkout(&cart_id, &address, return_url)
        .await
    {
        Ok(payment_url) => {
            add_breadcrumb("checkout", "Payment session opened", None);
            htmx::redirect(hx, payment_url.as_str())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open checkout session");
            let message = e.user_message();
            render(hx, nav, cart_id, form, FieldErrors::new(), Some(message))
        }
    }
}

fn render(
    hx: HxRequest,
    nav: Nav,
    cart_id: CartId,
    form: ShippingInput,
    errors: FieldErrors,
    error: Option<String>,
) -> Response {
    let cart_id = cart_id.into_inner();
    if hx.0 {
        CheckoutFormTemplate {
            cart_id,
            form,
            errors,
            error,
        }
        .into_response()
    } else {
        CheckoutTemplate {
            nav,
            cart_id,
            form,
            errors,
            error,
        }
        .into_response()
    }
}
