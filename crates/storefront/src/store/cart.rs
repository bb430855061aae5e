//! Cart operations on behalf of one visitor.

use tracing::instrument;
use url::Url;

use freshcart_core::{CartId, CartState, ProductId, ShippingAddress};

use super::CartCounts;
use crate::api::{ApiError, CartAck, CartReply, EcommerceClient};
use crate::models::SessionToken;

/// Cart proxy bound to a token snapshot.
///
/// Every operation is one remote round trip, plus a cart read when a mutation
/// reply omits the cart. The displayed count in [`CartCounts`] is only ever
/// assigned from a count the service confirmed; on error, or when a reply
/// confirms nothing, it is left as it was.
pub struct CartProxy {
    client: EcommerceClient,
    counts: CartCounts,
    token: SessionToken,
}

impl CartProxy {
    #[must_use]
    pub const fn new(client: EcommerceClient, counts: CartCounts, token: SessionToken) -> Self {
        Self {
            client,
            counts,
            token,
        }
    }

    /// The count shown in the navigation badge.
    ///
    /// Served from memory when known; otherwise fetched once and remembered.
    ///
    /// # Errors
    ///
    /// Returns an error if the count is unknown and the fetch fails.
    pub async fn count(&self) -> Result<u32, ApiError> {
        if let Some(count) = self.counts.get(&self.token).await {
            return Ok(count);
        }
        Ok(self.list().await?.item_count)
    }

    /// Fetch the full cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<CartState, ApiError> {
        let reply = self.client.get_cart(&self.token).await?;
        self.confirm(reply.item_count).await;
        Ok(reply.cart.unwrap_or_else(CartState::empty))
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn add(&self, product: &ProductId) -> Result<CartAck, ApiError> {
        let ack = self.client.add_to_cart(&self.token, product).await?;
        self.confirm(ack.item_count).await;
        Ok(ack)
    }

    /// Set the quantity of `product`.
    ///
    /// A quantity of zero or less removes the line, exactly as [`Self::remove`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn update_quantity(
        &self,
        product: &ProductId,
        quantity: i64,
    ) -> Result<CartState, ApiError> {
        if quantity <= 0 {
            return self.remove(product).await;
        }

        let count = u32::try_from(quantity).unwrap_or(u32::MAX);
        let reply = self
            .client
            .update_cart_item(&self.token, product, count)
            .await?;
        self.settle(reply).await
    }

    /// Remove the line for `product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn remove(&self, product: &ProductId) -> Result<CartState, ApiError> {
        let reply = self.client.remove_cart_item(&self.token, product).await?;
        self.settle(reply).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.client.clear_cart(&self.token).await?;
        self.counts.set(&self.token, 0).await;
        Ok(())
    }

    /// Record a count the service confirmed; an unconfirmed one changes nothing.
    async fn confirm(&self, item_count: Option<u32>) {
        if let Some(count) = item_count {
            self.counts.set(&self.token, count).await;
        }
    }

    /// The cart after a successful mutation.
    ///
    /// A reply without the document is followed by a read of the cart.
    async fn settle(&self, reply: CartReply) -> Result<CartState, ApiError> {
        self.confirm(reply.item_count).await;
        match reply.cart {
            Some(cart) => Ok(cart),
            None => self.list().await,
        }
    }

    /// Open a payment session and return the URL to send the visitor to.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, shipping), fields(cart_id = %cart_id))]
    pub async fn checkout(
        &self,
        cart_id: &CartId,
        shipping: &ShippingAddress,
        return_url: &str,
    ) -> Result<Url, ApiError> {
        self.client
            .checkout_session(&self.token, cart_id, shipping, return_url)
            .await
    }
}
