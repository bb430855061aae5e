//! Route table and the access-control decision.
//!
//! The storefront's router consults [`guard`] before any protected handler
//! runs. Keeping the decision here, free of HTTP types, lets it be tested
//! exhaustively.

use core::fmt;

use crate::types::{CartId, ProductId};

/// Every destination the storefront serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Products,
    ProductDetails(ProductId),
    Categories,
    Brands,
    Cart,
    Wishlist,
    Checkout(CartId),
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    NotFound,
}

impl Route {
    /// Sign-in entry point used for every redirect away from a protected route.
    pub const SIGN_IN_PATH: &'static str = "/login";

    /// Resolve a request path to a route.
    ///
    /// Sub-actions (`/cart/add`, `/wishlist/remove`, ...) resolve to the
    /// route that owns them, so they share its access rule.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let mut segments = path.trim_matches('/').split('/').filter(|s| !s.is_empty());
        let first = segments.next();
        let second = segments.next();

        match (first, second) {
            (None, _) => Self::Home,
            (Some("products"), None) => Self::Products,
            (Some("products"), Some(id)) => Self::ProductDetails(ProductId::new(id)),
            (Some("categories"), _) => Self::Categories,
            (Some("brands"), _) => Self::Brands,
            (Some("cart"), _) => Self::Cart,
            (Some("wishlist"), _) => Self::Wishlist,
            (Some("checkout"), Some(id)) => Self::Checkout(CartId::new(id)),
            (Some("login"), None) => Self::Login,
            (Some("register"), None) => Self::Register,
            (Some("forgot-password"), _) => Self::ForgotPassword,
            (Some("reset-password"), None) => Self::ResetPassword,
            _ => Self::NotFound,
        }
    }

    /// The canonical path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Products => "/products".to_string(),
            Self::ProductDetails(id) => format!("/products/{id}"),
            Self::Categories => "/categories".to_string(),
            Self::Brands => "/brands".to_string(),
            Self::Cart => "/cart".to_string(),
            Self::Wishlist => "/wishlist".to_string(),
            Self::Checkout(id) => format!("/checkout/{id}"),
            Self::Login => Self::SIGN_IN_PATH.to_string(),
            Self::Register => "/register".to_string(),
            Self::ForgotPassword => "/forgot-password".to_string(),
            Self::ResetPassword => "/reset-password".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Whether this route needs a signed-in visitor.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Self::Login
                | Self::Register
                | Self::ForgotPassword
                | Self::ResetPassword
                | Self::NotFound
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of evaluating the guard for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Run the requested view.
    Render,
    /// Send the visitor to [`Route::SIGN_IN_PATH`] without running the view.
    RedirectToSignIn,
}

/// Decide whether a navigation may proceed.
///
/// `signed_in` must be read from the live session at the moment of the
/// navigation; the result is never cached.
#[must_use]
pub const fn guard(route: &Route, signed_in: bool) -> GuardDecision {
    if route.requires_auth() && !signed_in {
        GuardDecision::RedirectToSignIn
    } else {
        GuardDecision::Render
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTECTED: &[&str] = &[
        "/",
        "/products",
        "/products/6428ebc6dc1175abc65ca0b9",
        "/categories",
        "/brands",
        "/cart",
        "/cart/add",
        "/cart/update",
        "/wishlist",
        "/wishlist/remove",
        "/checkout/abc",
    ];

    const PUBLIC: &[&str] = &[
        "/login",
        "/register",
        "/forgot-password",
        "/forgot-password/verify",
        "/reset-password",
        "/does-not-exist",
    ];

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path(""), Route::Home);
        assert_eq!(Route::from_path("/products"), Route::Products);
        assert_eq!(Route::from_path("/products/"), Route::Products);
        assert_eq!(
            Route::from_path("/products/p1"),
            Route::ProductDetails(ProductId::new("p1"))
        );
        assert_eq!(
            Route::from_path("/checkout/c1"),
            Route::Checkout(CartId::new("c1"))
        );
        assert_eq!(Route::from_path("/checkout"), Route::NotFound);
        assert_eq!(Route::from_path("/cart/remove"), Route::Cart);
        assert_eq!(Route::from_path("/nope"), Route::NotFound);
    }

    #[test]
    fn test_path_roundtrips_through_from_path() {
        let routes = [
            Route::Home,
            Route::Products,
            Route::ProductDetails(ProductId::new("p1")),
            Route::Categories,
            Route::Brands,
            Route::Cart,
            Route::Wishlist,
            Route::Checkout(CartId::new("c1")),
            Route::Login,
            Route::Register,
            Route::ForgotPassword,
            Route::ResetPassword,
        ];
        for route in routes {
            assert_eq!(Route::from_path(&route.path()), route);
        }
    }

    #[test]
    fn test_guard_redirects_every_protected_path_when_signed_out() {
        for path in PROTECTED {
            let route = Route::from_path(path);
            assert_eq!(
                guard(&route, false),
                GuardDecision::RedirectToSignIn,
                "{path} should be protected"
            );
            assert_eq!(guard(&route, true), GuardDecision::Render);
        }
    }

    #[test]
    fn test_guard_renders_public_paths_regardless_of_session() {
        for path in PUBLIC {
            let route = Route::from_path(path);
            assert_eq!(guard(&route, false), GuardDecision::Render, "{path}");
            assert_eq!(guard(&route, true), GuardDecision::Render, "{path}");
        }
    }

    #[test]
    fn test_sign_in_path_is_public() {
        let route = Route::from_path(Route::SIGN_IN_PATH);
        assert_eq!(route, Route::Login);
        assert!(!route.requires_auth());
    }
}
