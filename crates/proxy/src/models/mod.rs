//! Domain models for the personalization proxy.
//!
//! These are the validated shapes services hand to each other; the raw
//! upstream DTOs live in [`crate::shopify::types`].

pub mod customer;
pub mod personalization;
pub mod product;

pub use customer::{
    ASSIGNED_PRODUCT_KEY, CustomerCreateRequest, CustomerRecord, METAFIELD_NAMESPACE,
    METAFIELD_TYPE, PROFILE_IMAGE_KEY, PersonalizationMetafields,
};
pub use personalization::{AssignedProduct, PersonalizationResult};
pub use product::{ProductCreateRequest, ProductRecord};
