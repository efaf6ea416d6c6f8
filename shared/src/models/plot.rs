//! Plot (hectare) models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::deserialize_lenient_text;

/// A registered cultivation unit
///
/// Crop and soil are stored by name rather than by catalog code, so a plot
/// stays readable after its crop type is renamed or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plot {
    pub number: i64,
    pub crop_type_name: String,
    pub sown_on: NaiveDate,
    pub first_harvest_on: NaiveDate,
    pub routine_harvest_on: NaiveDate,
    pub soil_type_name: Option<String>,
    /// Temperature in °C, absent when the operator left it blank or typed
    /// something that is not a number
    pub temperature: Option<Decimal>,
}

/// Raw field values for registering or editing a plot
///
/// Everything except the crop type name is free text straight from the
/// form; parsing happens in the registry so errors carry the field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlotInput {
    pub crop_type_name: String,
    #[serde(default)]
    pub sown_on: Option<String>,
    #[serde(default)]
    pub first_harvest_on: Option<String>,
    #[serde(default)]
    pub routine_harvest_on: Option<String>,
    #[serde(default)]
    pub soil_type_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub temperature: Option<String>,
}

impl PlotInput {
    /// Input with only the crop type and sowing date filled in
    pub fn sown(crop_type_name: impl Into<String>, sown_on: impl Into<String>) -> Self {
        Self {
            crop_type_name: crop_type_name.into(),
            sown_on: Some(sown_on.into()),
            ..Default::default()
        }
    }

    pub fn with_harvest_dates(
        mut self,
        first_harvest_on: impl Into<String>,
        routine_harvest_on: impl Into<String>,
    ) -> Self {
        self.first_harvest_on = Some(first_harvest_on.into());
        self.routine_harvest_on = Some(routine_harvest_on.into());
        self
    }

    pub fn with_soil(mut self, soil_type_name: impl Into<String>) -> Self {
        self.soil_type_name = Some(soil_type_name.into());
        self
    }

    pub fn with_temperature(mut self, temperature: impl Into<String>) -> Self {
        self.temperature = Some(temperature.into());
        self
    }
}
