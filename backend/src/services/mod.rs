//! Business logic services for the Crop Lifecycle Platform

pub mod catalog;
pub mod cultivation;
pub mod person;
pub mod plot;

pub use catalog::CatalogService;
pub use cultivation::CultivationService;
pub use person::PersonService;
pub use plot::PlotService;
