//! Wire shapes of the remote API and their conversion into domain types.
//!
//! Only the fields the storefront renders are decoded; everything else in a
//! document is ignored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use freshcart_core::{
    Brand, BrandId, CartId, CartLine, CartState, Category, CategoryId, PageMetadata, Price,
    Product, ProductId, ProductSummary, ShippingAddress, WishlistState,
};

/// Page size the remote catalog uses when none is requested.
pub const DEFAULT_PAGE_LIMIT: u32 = 40;

// =============================================================================
// Output types
// =============================================================================

/// One page of the product catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub metadata: PageMetadata,
}

/// Confirmation of an add-to-cart call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartAck {
    /// Server-confirmed item count, `None` when the response carried neither
    /// `numOfCartItems` nor the cart lines.
    pub item_count: Option<u32>,
    /// Service message, e.g. "Product added successfully to your cart".
    pub message: Option<String>,
}

/// A cart read or mutation as the service answered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartReply {
    /// Server-confirmed item count, as in [`CartAck::item_count`].
    pub item_count: Option<u32>,
    /// The cart, when the response carried the document.
    pub cart: Option<CartState>,
}

impl CartReply {
    /// Reply for a visitor who has no remote cart yet.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            item_count: Some(0),
            cart: Some(CartState::empty()),
        }
    }
}

// =============================================================================
// Documents
// =============================================================================

/// A category or brand as embedded in products and listed on its own.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: String,
}

impl From<TaxonDoc> for Category {
    fn from(doc: TaxonDoc) -> Self {
        Self {
            id: CategoryId::new(doc.id),
            name: doc.name,
            slug: doc.slug,
            image: doc.image,
        }
    }
}

impl From<TaxonDoc> for Brand {
    fn from(doc: TaxonDoc) -> Self {
        Self {
            id: BrandId::new(doc.id),
            name: doc.name,
            slug: doc.slug,
            image: doc.image,
        }
    }
}

/// A product document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub price_after_discount: Option<Decimal>,
    #[serde(default)]
    pub image_cover: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub ratings_average: f64,
    #[serde(default)]
    pub ratings_quantity: u32,
    #[serde(default)]
    pub category: Option<TaxonDoc>,
    #[serde(default)]
    pub brand: Option<TaxonDoc>,
}

impl From<ProductDoc> for Product {
    fn from(doc: ProductDoc) -> Self {
        Self {
            id: ProductId::new(doc.id),
            title: doc.title,
            description: doc.description,
            price: Price::egp(doc.price),
            price_after_discount: doc.price_after_discount.map(Price::egp),
            image_cover: doc.image_cover,
            images: doc.images,
            ratings_average: doc.ratings_average,
            ratings_quantity: doc.ratings_quantity,
            category: doc.category.map(Category::from),
            brand: doc.brand.map(Brand::from),
        }
    }
}

/// Pagination block of list responses.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDoc {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub number_of_pages: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn first_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl From<MetadataDoc> for PageMetadata {
    fn from(doc: MetadataDoc) -> Self {
        Self {
            current_page: doc.current_page.max(1),
            number_of_pages: doc.number_of_pages.max(1),
            limit: doc.limit,
        }
    }
}

/// `{ metadata?, data: [...] }`
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub metadata: Option<MetadataDoc>,
    pub data: Vec<T>,
}

/// `{ data: {...} }`
#[derive(Debug, Deserialize)]
pub struct ItemResponse<T> {
    pub data: T,
}

// =============================================================================
// Auth
// =============================================================================

/// Sign-in/sign-up/reset response carrying the issued token.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Responses whose only interesting field is the message.
#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailBody<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCodeBody<'a> {
    pub reset_code: &'a str,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody<'a> {
    pub product_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CountBody {
    pub count: u32,
}

/// Product reference inside a cart line: populated on reads, a bare ID in
/// mutation responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(CartProductDoc),
    Id(String),
}

/// The subset of a populated product embedded in a cart line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_cover: String,
}

impl From<ProductRef> for ProductSummary {
    fn from(product: ProductRef) -> Self {
        match product {
            ProductRef::Populated(doc) => Self {
                id: ProductId::new(doc.id),
                title: doc.title,
                image_cover: doc.image_cover,
            },
            ProductRef::Id(id) => Self {
                id: ProductId::new(id),
                title: String::new(),
                image_cover: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineDoc {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub price: Decimal,
    pub product: ProductRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub products: Vec<CartLineDoc>,
    #[serde(default)]
    pub total_cart_price: Decimal,
}

/// Every cart read and mutation answers with this shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(default)]
    pub num_of_cart_items: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<CartDoc>,
}

impl CartResponse {
    /// The item count the service vouched for.
    ///
    /// `numOfCartItems` counts cart lines, so a response that omits it but
    /// carries the document still confirms the count.
    #[must_use]
    pub fn confirmed_count(&self) -> Option<u32> {
        self.num_of_cart_items.or_else(|| {
            self.data
                .as_ref()
                .map(|cart| u32::try_from(cart.products.len()).unwrap_or(u32::MAX))
        })
    }
}

impl From<CartResponse> for CartReply {
    fn from(response: CartResponse) -> Self {
        let item_count = response.confirmed_count();
        let cart = response.data.map(|cart| CartState {
            cart_id: Some(CartId::new(cart.id)),
            item_count: item_count.unwrap_or_default(),
            items: cart
                .products
                .into_iter()
                .map(|line| CartLine {
                    product: line.product.into(),
                    quantity: line.count,
                    unit_price: Price::egp(line.price),
                })
                .collect(),
            total_price: Price::egp(cart.total_cart_price),
        });

        Self { item_count, cart }
    }
}

impl From<CartResponse> for CartAck {
    fn from(response: CartResponse) -> Self {
        Self {
            item_count: response.confirmed_count(),
            message: response.message,
        }
    }
}

// =============================================================================
// Wishlist
// =============================================================================

impl From<ListResponse<ProductDoc>> for WishlistState {
    fn from(response: ListResponse<ProductDoc>) -> Self {
        Self::from_products(response.data.into_iter().map(Product::from))
    }
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody<'a> {
    pub shipping_address: &'a ShippingAddress,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutResponse {
    pub session: CheckoutSessionDoc,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionDoc {
    pub url: String,
}
