//! Cultivation management (advisory ledger) models

use serde::{Deserialize, Serialize};

/// Advisory record linking a person, crop type, soil type and climate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CultivationRecord {
    pub code: i64,
    pub person_id: i64,
    pub crop_type_code: i64,
    pub soil_type_code: i64,
    pub climate_code: i64,
    pub video_ref: Option<String>,
    pub observations: Option<String>,
}

/// Input for creating or replacing a ledger record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CultivationInput {
    pub person_id: i64,
    pub crop_type_code: i64,
    pub soil_type_code: i64,
    pub climate_code: i64,
    #[serde(default)]
    pub video_ref: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
}

/// Ledger record joined with the names its foreign keys resolve to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CultivationView {
    #[serde(flatten)]
    pub record: CultivationRecord,
    pub person_username: String,
    pub crop_type_name: String,
    pub soil_type_name: String,
    pub climate_name: String,
}
