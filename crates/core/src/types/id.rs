//! Newtype IDs for type-safe entity references.
//!
//! The remote catalog identifies everything with opaque document IDs
//! (24-character hex strings in practice). Use the `define_id!` macro to
//! create wrappers that prevent accidentally mixing IDs from different
//! entity types.
//!
//! IDs end up as path segments of remote URLs, so anything arriving from a
//! visitor (form fields, route parameters) goes through [`define_id!`]'s
//! validating `Deserialize`: non-empty, at most [`ID_MAX_LENGTH`] bytes, and
//! only ASCII letters, digits, `-` and `_`.

/// Longest ID accepted from outside.
pub const ID_MAX_LENGTH: usize = 64;

/// Errors that can occur when parsing an ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty.
    #[error("ID cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("ID must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains something other than letters, digits, `-` or `_`.
    #[error("ID may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// Check that `id` is safe to use as a single URL path segment.
///
/// # Errors
///
/// Returns an [`IdError`] describing the first rule the input breaks.
pub fn validate_id(id: &str) -> Result<(), IdError> {
    if id.is_empty() {
        return Err(IdError::Empty);
    }
    if id.len() > ID_MAX_LENGTH {
        return Err(IdError::TooLong { max: ID_MAX_LENGTH });
    }
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(IdError::InvalidCharacter);
    }
    Ok(())
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]`
/// - `Deserialize` that rejects input failing [`validate_id`]
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()` (unchecked), `parse()`, `as_str()`, `into_inner()`
/// - `FromStr`, `AsRef<str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use freshcart_core::define_id;
/// define_id!(OrderRef);
/// define_id!(ShipmentRef);
///
/// let order = OrderRef::new("6428ebc6dc1175abc65ca0b9");
/// assert_eq!(order.as_str(), "6428ebc6dc1175abc65ca0b9");
/// assert!(OrderRef::parse("../cart").is_err());
///
/// // These are different types, so this won't compile:
/// // let _: ShipmentRef = order;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an ID taken from a trusted source, such as a remote
            /// response document.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parse an ID supplied by a visitor.
            ///
            /// # Errors
            ///
            /// Returns an error if `id` is not a safe path segment.
            pub fn parse(id: impl Into<String>) -> Result<Self, $crate::IdError> {
                let id = id.into();
                $crate::validate_id(&id)?;
                Ok(Self(id))
            }

            /// Get the underlying ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(raw).map_err(::serde::de::Error::custom)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Remote entity IDs
define_id!(ProductId);
define_id!(CartId);
define_id!(CategoryId);
define_id!(BrandId);
