//! Domain services over the Admin API.
//!
//! # Services
//!
//! - `customers` - Customer reads with personalization metafields, customer creation
//! - `products` - Product reads, store default product, product creation
//!
//! Services own no connection state; they hold a clone of the shared
//! [`crate::shopify::ApiClient`] and take a [`crate::shopify::Session`] per call.

pub mod customers;
pub mod products;

pub use customers::CustomerService;
pub use products::ProductService;
