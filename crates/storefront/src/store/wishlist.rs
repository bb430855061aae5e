//! Wishlist operations on behalf of one visitor.

use tracing::instrument;

use freshcart_core::{ProductId, WishlistState};

use crate::api::{ApiError, EcommerceClient};
use crate::models::SessionToken;

/// Result of a wishlist removal: the service's message and the refetched list.
#[derive(Debug, Clone)]
pub struct WishlistChange {
    pub message: Option<String>,
    pub wishlist: WishlistState,
}

/// Wishlist proxy bound to a token snapshot.
///
/// Removal is followed by a full refetch, so the returned list always reflects
/// the service's view.
pub struct WishlistProxy {
    client: EcommerceClient,
    token: SessionToken,
}

impl WishlistProxy {
    #[must_use]
    pub const fn new(client: EcommerceClient, token: SessionToken) -> Self {
        Self { client, token }
    }

    /// Fetch the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<WishlistState, ApiError> {
        self.client.get_wishlist(&self.token).await
    }

    /// Add `product`. Returns the service message.
    ///
    /// Nothing on the calling page shows the list, so it is not refetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn add(&self, product: &ProductId) -> Result<Option<String>, ApiError> {
        self.client.add_to_wishlist(&self.token, product).await
    }

    /// Remove `product`, then refetch.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn remove(&self, product: &ProductId) -> Result<WishlistChange, ApiError> {
        let message = self
            .client
            .remove_from_wishlist(&self.token, product)
            .await?;
        let wishlist = self.list().await?;
        Ok(WishlistChange { message, wishlist })
    }
}
