//! Numeric IDs and their global (GraphQL) counterparts.
//!
//! The upstream platform addresses the same resource two ways: REST uses the
//! plain numeric id (`123`), GraphQL uses a namespaced global id
//! (`gid://shopify/Customer/123`). [`to_global_id`] and [`to_numeric_id`] are
//! the only places that know the global id format.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different resource types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every global id.
pub const GLOBAL_ID_PREFIX: &str = "gid://shopify";

/// Errors that can occur when parsing a global id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedIdError {
    /// The input contains no `/`-separated path segments.
    #[error("malformed global id '{0}': no path segments")]
    NoPathSegments(String),
    /// The trailing segment is not a base-10 integer.
    #[error("malformed global id '{0}': trailing segment is not an integer")]
    InvalidNumber(String),
}

/// A namespaced global identifier, e.g. `gid://shopify/Product/456`.
///
/// Always derived from a numeric id; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalId(String);

impl GlobalId {
    /// Returns the global id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the trailing numeric segment.
    ///
    /// # Errors
    ///
    /// See [`to_numeric_id`].
    pub fn numeric_id(&self) -> Result<i64, MalformedIdError> {
        to_numeric_id(&self.0)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GlobalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Format a numeric id as a global id for the given resource type.
///
/// ```
/// use shop_persona_core::to_global_id;
///
/// assert_eq!(to_global_id(123, "Customer").as_str(), "gid://shopify/Customer/123");
/// ```
#[must_use]
pub fn to_global_id(numeric_id: i64, resource_type: &str) -> GlobalId {
    GlobalId(format!("{GLOBAL_ID_PREFIX}/{resource_type}/{numeric_id}"))
}

/// Extract the numeric id from a global id.
///
/// Splits on `/` and parses the trailing segment as a base-10 integer.
///
/// # Errors
///
/// Returns [`MalformedIdError::NoPathSegments`] if the input contains no `/`,
/// and [`MalformedIdError::InvalidNumber`] if the trailing segment does not
/// parse as an integer.
///
/// ```
/// use shop_persona_core::to_numeric_id;
///
/// assert_eq!(to_numeric_id("gid://shopify/Product/456"), Ok(456));
/// assert!(to_numeric_id("456").is_err());
/// assert!(to_numeric_id("gid://shopify/Product/").is_err());
/// ```
pub fn to_numeric_id(global_id: &str) -> Result<i64, MalformedIdError> {
    let (_, tail) = global_id
        .rsplit_once('/')
        .ok_or_else(|| MalformedIdError::NoPathSegments(global_id.to_owned()))?;

    tail.parse::<i64>()
        .map_err(|_| MalformedIdError::InvalidNumber(global_id.to_owned()))
}

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - Global id conversion bound to the resource type: `to_global_id()`,
///   `from_global_id()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use shop_persona_core::define_id;
/// define_id!(OrderId, "Order");
///
/// let order_id = OrderId::new(7);
/// assert_eq!(order_id.to_global_id().as_str(), "gid://shopify/Order/7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Resource type name used in global ids.
            pub const RESOURCE_TYPE: &'static str = $resource;

            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }

            /// Format as a global id.
            #[must_use]
            pub fn to_global_id(&self) -> $crate::GlobalId {
                $crate::to_global_id(self.0, Self::RESOURCE_TYPE)
            }

            /// Parse from a global id.
            ///
            /// # Errors
            ///
            /// Returns an error if the global id is malformed.
            pub fn from_global_id(
                global_id: &str,
            ) -> ::core::result::Result<Self, $crate::MalformedIdError> {
                $crate::to_numeric_id(global_id).map(Self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(CustomerId, "Customer");
define_id!(ProductId, "Product");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_global_id_format() {
        assert_eq!(
            to_global_id(123, "Customer").as_str(),
            "gid://shopify/Customer/123"
        );
    }

    #[test]
    fn test_round_trip() {
        for n in [0_i64, 1, 42, 7_654_321, i64::MAX] {
            for resource in ["Customer", "Product", "ProductVariant", "Metafield"] {
                assert_eq!(to_numeric_id(to_global_id(n, resource).as_str()), Ok(n));
            }
        }
    }

    #[test]
    fn test_to_numeric_id_without_segments() {
        assert_eq!(
            to_numeric_id("123"),
            Err(MalformedIdError::NoPathSegments("123".to_string()))
        );
        assert!(matches!(
            to_numeric_id(""),
            Err(MalformedIdError::NoPathSegments(_))
        ));
    }

    #[test]
    fn test_to_numeric_id_bad_trailing_segment() {
        assert!(matches!(
            to_numeric_id("gid://shopify/Customer/"),
            Err(MalformedIdError::InvalidNumber(_))
        ));
        assert!(matches!(
            to_numeric_id("gid://shopify/Customer/abc"),
            Err(MalformedIdError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_typed_ids_carry_resource_type() {
        let product = ProductId::new(456);
        assert_eq!(product.to_global_id().as_str(), "gid://shopify/Product/456");
        assert_eq!(
            CustomerId::from_global_id("gid://shopify/Customer/9"),
            Ok(CustomerId::new(9))
        );
    }

    #[test]
    fn test_global_id_numeric_id() {
        let gid = to_global_id(88, "Product");
        assert_eq!(gid.numeric_id(), Ok(88));
        assert_eq!(gid.to_string(), "gid://shopify/Product/88");
    }

    #[test]
    fn test_id_serde_transparent() {
        let json = serde_json::to_string(&ProductId::new(456)).unwrap();
        assert_eq!(json, "456");
        let parsed: CustomerId = serde_json::from_str("123").unwrap();
        assert_eq!(parsed.as_i64(), 123);
    }
}
