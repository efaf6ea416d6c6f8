//! Domain models for the Crop Lifecycle Platform

mod catalog;
mod crop_type;
mod cultivation;
mod person;
mod plot;

pub use catalog::*;
pub use crop_type::*;
pub use cultivation::*;
pub use person::*;
pub use plot::*;
