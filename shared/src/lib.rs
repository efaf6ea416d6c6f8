//! Shared types and models for the Crop Lifecycle Platform
//!
//! This crate contains the domain model, the harvest rule engine and the
//! boundary parsing rules shared between the backend and the WASM form
//! helpers.

pub mod error;
pub mod lifecycle;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use lifecycle::*;
pub use models::*;
pub use types::*;
pub use validation::*;
