//! Shop Persona Core - Shared types library.
//!
//! This crate provides the types shared by every Shop Persona component:
//! - `proxy` - Personalization proxy (HTTP server + upstream access layer)
//! - `cli` - Command-line tools for seeding and ad-hoc lookups
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed numeric IDs, global ID translation, prices and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
