//! Soil type and climate catalog models, plus the kind-tagged wrappers used
//! by the generic catalog operations

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CropType, CropTypeInput};
use crate::types::CatalogKind;

/// A soil type (e.g. clay, loam)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoilType {
    pub code: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_ref: Option<String>,
}

/// Input for creating or updating a soil type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoilTypeInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// A climate classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Climate {
    pub code: i64,
    pub name: String,
    /// Reference temperature in °C (informational only)
    pub reference_temperature: Option<Decimal>,
    pub description: Option<String>,
    pub image_ref: Option<String>,
}

/// Input for creating or updating a climate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClimateInput {
    pub name: String,
    #[serde(default)]
    pub reference_temperature: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// Any catalog entry, tagged by kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "entry", rename_all = "snake_case")]
pub enum CatalogEntry {
    CropType(CropType),
    SoilType(SoilType),
    Climate(Climate),
}

impl CatalogEntry {
    pub fn kind(&self) -> CatalogKind {
        match self {
            CatalogEntry::CropType(_) => CatalogKind::CropType,
            CatalogEntry::SoilType(_) => CatalogKind::SoilType,
            CatalogEntry::Climate(_) => CatalogKind::Climate,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            CatalogEntry::CropType(c) => c.code,
            CatalogEntry::SoilType(s) => s.code,
            CatalogEntry::Climate(c) => c.code,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogEntry::CropType(c) => &c.name,
            CatalogEntry::SoilType(s) => &s.name,
            CatalogEntry::Climate(c) => &c.name,
        }
    }
}

/// Input for the generic upsert operation, tagged by kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "entry", rename_all = "snake_case")]
pub enum CatalogInput {
    CropType(CropTypeInput),
    SoilType(SoilTypeInput),
    Climate(ClimateInput),
}

impl CatalogInput {
    pub fn kind(&self) -> CatalogKind {
        match self {
            CatalogInput::CropType(_) => CatalogKind::CropType,
            CatalogInput::SoilType(_) => CatalogKind::SoilType,
            CatalogInput::Climate(_) => CatalogKind::Climate,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogInput::CropType(c) => &c.name,
            CatalogInput::SoilType(s) => &s.name,
            CatalogInput::Climate(c) => &c.name,
        }
    }
}

/// Soil types seeded into an empty catalog (name, description)
pub const BUILTIN_SOIL_TYPES: [(&str, &str); 4] = [
    ("Clay", "Fine particles, high water retention, slow drainage"),
    ("Sandy", "Coarse particles, fast drainage, low nutrient retention"),
    ("Silty", "Smooth texture, fertile, retains moisture well"),
    ("Loam", "Balanced mix of sand, silt and clay"),
];

/// A climate seeded into an empty catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinClimate {
    pub name: &'static str,
    /// Reference temperature in whole °C
    pub reference_temperature: i32,
    pub description: &'static str,
}

pub const BUILTIN_CLIMATES: [BuiltinClimate; 5] = [
    BuiltinClimate {
        name: "Tropical",
        reference_temperature: 27,
        description: "Warm all year with abundant rainfall",
    },
    BuiltinClimate {
        name: "Arid",
        reference_temperature: 30,
        description: "Hot days, little rainfall, irrigation required",
    },
    BuiltinClimate {
        name: "Temperate",
        reference_temperature: 15,
        description: "Mild summers and cool winters",
    },
    BuiltinClimate {
        name: "Continental",
        reference_temperature: 10,
        description: "Warm summers and cold winters with frost",
    },
    BuiltinClimate {
        name: "Highland",
        reference_temperature: 8,
        description: "Cool temperatures that drop with altitude",
    },
];
