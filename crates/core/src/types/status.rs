//! Status enums reported by the upstream platform.

use serde::{Deserialize, Serialize};

/// Product publication status.
///
/// Maps to the Admin API `ProductStatus` enum. Values this crate does not know
/// about decode as [`ProductStatus::Unknown`] rather than failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Visible and purchasable.
    Active,
    /// Not yet published.
    #[default]
    Draft,
    /// Retired from the catalog.
    Archived,
    /// Published but hidden from listings.
    Unlisted,
    /// Any status added upstream after this enum was written.
    #[serde(other)]
    Unknown,
}

impl ProductStatus {
    /// Whether the product can be sold at all.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_wire_names() {
        let status: ProductStatus = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(status, ProductStatus::Active);
        assert!(status.is_active());
        assert_eq!(
            serde_json::to_string(&ProductStatus::Archived).unwrap(),
            "\"ARCHIVED\""
        );
    }

    #[test]
    fn test_unknown_status_is_not_active() {
        let status: ProductStatus = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(status, ProductStatus::Unknown);
        assert!(!status.is_active());
    }
}
