//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::api::EcommerceClient;
use crate::config::StorefrontConfig;
use crate::models::SessionToken;
use crate::store::{CartCounts, CartProxy, WishlistProxy};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the remote API client and configuration.
/// Per-visitor state is not kept here; proxies are built per request from
/// the visitor's token.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    api: EcommerceClient,
    cart_counts: CartCounts,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool backing the session store
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let api = EcommerceClient::new(&config.api);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                api,
                cart_counts: CartCounts::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the remote API client.
    #[must_use]
    pub fn api(&self) -> &EcommerceClient {
        &self.inner.api
    }

    /// Get a reference to the displayed cart counts.
    #[must_use]
    pub fn cart_counts(&self) -> &CartCounts {
        &self.inner.cart_counts
    }

    /// Cart operations for the visitor holding `token`.
    #[must_use]
    pub fn cart(&self, token: SessionToken) -> CartProxy {
        CartProxy::new(self.api().clone(), self.cart_counts().clone(), token)
    }

    /// Wishlist operations for the visitor holding `token`.
    #[must_use]
    pub fn wishlist(&self, token: SessionToken) -> WishlistProxy {
        WishlistProxy::new(self.api().clone(), token)
    }
}
