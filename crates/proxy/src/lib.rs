//! Shop Persona proxy library.
//!
//! Personalization proxy in front of the Shopify Admin API, exposed as a
//! library so the CLI and the integration tests can drive it directly.
//!
//! # Modules
//!
//! - [`shopify`] - Admin API client with retry, envelope validation and DTOs
//! - [`services`] - Customer and product services
//! - [`personalize`] - Fallback chain producing a [`models::PersonalizationResult`]
//! - [`seeder`] - Batch creation of sample products and customers
//! - [`routes`] - HTTP surface (`/health`, `/proxy/personalize`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod personalize;
pub mod routes;
pub mod seeder;
pub mod services;
pub mod shopify;
pub mod state;
