//! HTTP request handlers

pub mod catalog;
pub mod cultivation;
pub mod health;
pub mod lifecycle;
pub mod person;
pub mod plot;

pub use catalog::*;
pub use cultivation::*;
pub use health::*;
pub use lifecycle::*;
pub use person::*;
pub use plot::*;
