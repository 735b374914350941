//! Core types for Shop Persona.
//!
//! This module provides type-safe wrappers for the upstream platform's
//! identifiers and values.

pub mod id;
pub mod price;
pub mod status;

pub use id::*;
pub use price::{Price, PriceError};
pub use status::ProductStatus;
