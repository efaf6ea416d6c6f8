//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Boundary date format (strict `YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The three kinds of reference entity held by the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    CropType,
    SoilType,
    Climate,
}

impl CatalogKind {
    /// Human readable label, also used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            CatalogKind::CropType => "Crop type",
            CatalogKind::SoilType => "Soil type",
            CatalogKind::Climate => "Climate",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
