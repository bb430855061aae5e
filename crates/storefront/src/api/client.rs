//! Remote e-commerce API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Caches products, categories and brands
//! using `moka` (TTL from configuration).

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use freshcart_core::{
    Brand, CartId, Category, Credentials, Email, PageMetadata, PasswordReset, Product, ProductId,
    Registration, ShippingAddress, WishlistState,
};

use super::cache::{CacheKey, CacheValue};
use super::envelope;
use super::types::{
    CartAck, CartReply, CartResponse, CheckoutBody, CheckoutResponse, CountBody, DEFAULT_PAGE_LIMIT,
    EmailBody, ItemResponse, ListResponse, MessageResponse, ProductBody, ProductDoc, ProductPage,
    ResetCodeBody, TaxonDoc, TokenResponse,
};
use super::ApiError;
use crate::config::EcommerceApiConfig;
use crate::models::SessionToken;

/// Request header carrying the visitor's token.
pub const TOKEN_HEADER: &str = "token";

/// Maximum number of cached catalog entries.
const CACHE_CAPACITY: u64 = 1000;

/// How much of an unexpected body to log.
const LOG_BODY_CHARS: usize = 500;

// =============================================================================
// EcommerceClient
// =============================================================================

/// Client for the remote e-commerce API.
///
/// Cheap to clone; all clones share one connection pool and one catalog
/// cache. Cart and wishlist calls are never cached.
#[derive(Clone)]
pub struct EcommerceClient {
    inner: Arc<EcommerceClientInner>,
}

struct EcommerceClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl EcommerceClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &EcommerceApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Self {
            inner: Arc::new(EcommerceClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    /// Build an absolute URL from path segments under the configured base.
    ///
    /// Each segment is percent-encoded on its own, so an ID can never add,
    /// climb or terminate path segments.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.inner.base_url)?;
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&SessionToken>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.header(TOKEN_HEADER, token.expose()),
            None => builder,
        }
    }

    /// Send a request and decode the envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Remote API unreachable");
        })?;

        let status = response.status();
        let body = response.text().await?;

        envelope::decode(status, &body).inspect_err(|e| {
            if e.is_server_fault() {
                tracing::error!(
                    status = %status,
                    error = %e,
                    body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
                    "Remote API returned an unreadable response"
                );
            } else {
                debug!(status = %status, error = %e, "Remote API rejected request");
            }
        })
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &[&str],
        token: Option<&SessionToken>,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.send(self.request(method, url, token).json(body)).await
    }

    async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(self.request(method, url, token)).await
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for bad credentials and
    /// `ApiError::MissingToken` if the response has no usable token.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SessionToken, ApiError> {
        let response: TokenResponse = self
            .send_json(Method::POST, &["auth", "signin"], None, credentials)
            .await?;

        response
            .token
            .and_then(SessionToken::new)
            .ok_or(ApiError::MissingToken)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the service refuses the registration,
    /// e.g. because the email is already in use.
    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn sign_up(&self, registration: &Registration) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .send_json(Method::POST, &["auth", "signup"], None, registration)
            .await?;
        Ok(())
    }

    /// Ask the service to email a reset code.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if no account uses the address.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn forgot_password(&self, email: &Email) -> Result<Option<String>, ApiError> {
        let body = EmailBody {
            email: email.as_str(),
        };
        let response: MessageResponse = self
            .send_json(Method::POST, &["auth", "forgotPasswords"], None, &body)
            .await?;
        Ok(response.message)
    }

    /// Check a reset code.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the code is wrong or expired.
    #[instrument(skip_all)]
    pub async fn verify_reset_code(&self, reset_code: &str) -> Result<(), ApiError> {
        let body = ResetCodeBody { reset_code };
        let _: MessageResponse = self
            .send_json(Method::POST, &["auth", "verifyResetCode"], None, &body)
            .await?;
        Ok(())
    }

    /// Set a new password after a verified reset code.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the reset is refused.
    #[instrument(skip_all, fields(email = %reset.email))]
    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<(), ApiError> {
        let _: TokenResponse = self
            .send_json(Method::PUT, &["auth", "resetPassword"], None, reset)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Catalog Methods (cached)
    // =========================================================================

    /// Get one page of the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, page: u32) -> Result<ProductPage, ApiError> {
        let page = page.max(1);
        let cache_key = CacheKey::Products { page };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.url(&["products"])?;
        url.query_pairs_mut().append_pair("page", &page.to_string());

        let response: ListResponse<ProductDoc> =
            self.send(self.request(Method::GET, url, None)).await?;

        let products = ProductPage {
            metadata: response
                .metadata
                .map_or_else(|| PageMetadata::single(DEFAULT_PAGE_LIMIT), Into::into),
            products: response.data.into_iter().map(Product::from).collect(),
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product doesn't exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response: ItemResponse<Option<ProductDoc>> = self
            .send_empty(Method::GET, &["products", id.as_str()], None)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ApiError::NotFound(format!("Product {id}"))
                } else {
                    e
                }
            })?;

        let product = response
            .data
            .map(Product::from)
            .ok_or_else(|| ApiError::NotFound(format!("Product {id}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let response: ListResponse<TaxonDoc> =
            self.send_empty(Method::GET, &["categories"], None).await?;
        let categories: Vec<Category> = response.data.into_iter().map(Category::from).collect();

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// List all brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&CacheKey::Brands).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let response: ListResponse<TaxonDoc> =
            self.send_empty(Method::GET, &["brands"], None).await?;
        let brands: Vec<Brand> = response.data.into_iter().map(Brand::from).collect();

        self.inner
            .cache
            .insert(CacheKey::Brands, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get the visitor's cart.
    ///
    /// A visitor who never added anything has no remote cart; the service
    /// answers 404, which is reported here as an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn get_cart(&self, token: &SessionToken) -> Result<CartReply, ApiError> {
        match self
            .send_empty::<CartResponse>(Method::GET, &["cart"], Some(token))
            .await
        {
            Ok(response) => Ok(response.into()),
            Err(e) if e.is_not_found() => Ok(CartReply::empty()),
            Err(e) => Err(e),
        }
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn add_to_cart(
        &self,
        token: &SessionToken,
        product: &ProductId,
    ) -> Result<CartAck, ApiError> {
        let body = ProductBody {
            product_id: product.as_str(),
        };
        let response: CartResponse = self
            .send_json(Method::POST, &["cart"], Some(token), &body)
            .await?;
        Ok(response.into())
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn update_cart_item(
        &self,
        token: &SessionToken,
        product: &ProductId,
        count: u32,
    ) -> Result<CartReply, ApiError> {
        let response: CartResponse = self
            .send_json(
                Method::PUT,
                &["cart", product.as_str()],
                Some(token),
                &CountBody { count },
            )
            .await?;
        Ok(response.into())
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn remove_cart_item(
        &self,
        token: &SessionToken,
        product: &ProductId,
    ) -> Result<CartReply, ApiError> {
        let response: CartResponse = self
            .send_empty(Method::DELETE, &["cart", product.as_str()], Some(token))
            .await?;
        Ok(response.into())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn clear_cart(&self, token: &SessionToken) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .send_empty(Method::DELETE, &["cart"], Some(token))
            .await?;
        Ok(())
    }

    /// Open a hosted payment session for a cart.
    ///
    /// `return_url` is where the payment provider sends the visitor back.
    /// The returned payment URL is always `http` or `https`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails, or if the payment URL is
    /// not a web address.
    #[instrument(skip(self, token, shipping), fields(cart_id = %cart_id))]
    pub async fn checkout_session(
        &self,
        token: &SessionToken,
        cart_id: &CartId,
        shipping: &ShippingAddress,
        return_url: &str,
    ) -> Result<Url, ApiError> {
        let mut url = self.url(&["orders", "checkout-session", cart_id.as_str()])?;
        url.query_pairs_mut().append_pair("url", return_url);

        let body = CheckoutBody {
            shipping_address: shipping,
        };
        let response: CheckoutResponse = self
            .send(self.request(Method::POST, url, Some(token)).json(&body))
            .await?;
        payment_url(&response.session.url)
    }

    // =========================================================================
    // Wishlist Methods (not cached - mutable state)
    // =========================================================================

    /// Get the visitor's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn get_wishlist(&self, token: &SessionToken) -> Result<WishlistState, ApiError> {
        let response: ListResponse<ProductDoc> = self
            .send_empty(Method::GET, &["wishlist"], Some(token))
            .await?;
        Ok(response.into())
    }

    /// Add a product to the wishlist. Returns the service message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn add_to_wishlist(
        &self,
        token: &SessionToken,
        product: &ProductId,
    ) -> Result<Option<String>, ApiError> {
        let body = ProductBody {
            product_id: product.as_str(),
        };
        let response: MessageResponse = self
            .send_json(Method::POST, &["wishlist"], Some(token), &body)
            .await?;
        Ok(response.message)
    }

    /// Remove a product from the wishlist. Returns the service message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn remove_from_wishlist(
        &self,
        token: &SessionToken,
        product: &ProductId,
    ) -> Result<Option<String>, ApiError> {
        let response: MessageResponse = self
            .send_empty(Method::DELETE, &["wishlist", product.as_str()], Some(token))
            .await?;
        Ok(response.message)
    }
}

/// Parse a payment URL from the service, accepting only web addresses.
fn payment_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::UnsafeRedirect(other.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> EcommerceClient {
        EcommerceClient::new(&EcommerceApiConfig {
            base_url: base_url.to_string(),
            ..EcommerceApiConfig::default()
        })
    }

    #[test]
    fn test_url_joins_segments_under_base() {
        let client = client("https://ecommerce.routemisr.com/api/v1/");
        assert_eq!(
            client.url(&["cart", "p1"]).unwrap().as_str(),
            "https://ecommerce.routemisr.com/api/v1/cart/p1"
        );
        assert_eq!(
            client.url(&["auth", "signin"]).unwrap().as_str(),
            "https://ecommerce.routemisr.com/api/v1/auth/signin"
        );
    }

    #[test]
    fn test_url_keeps_unchecked_id_inside_one_segment() {
        let client = client("https://ecommerce.routemisr.com/api/v1");
        let id = ProductId::new("x/../../wishlist/P9?count=1");
        let url = client.url(&["cart", id.as_str()]).unwrap();
        assert!(url.path().starts_with("/api/v1/cart/"));
        assert_eq!(url.path_segments().unwrap().count(), 4);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_payment_url_accepts_web_addresses_only() {
        assert_eq!(
            payment_url("https://checkout.stripe.com/c/pay/cs_1").unwrap().as_str(),
            "https://checkout.stripe.com/c/pay/cs_1"
        );
        assert!(matches!(
            payment_url("javascript:alert(1)"),
            Err(ApiError::UnsafeRedirect(_))
        ));
        assert!(matches!(payment_url("not a url"), Err(ApiError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let client = client("http://127.0.0.1:9/api/v1");
        let err = client.categories().await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
        assert!(err.is_server_fault());
    }
}
