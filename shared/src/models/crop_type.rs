//! Crop type (hortaliza) models

use serde::{Deserialize, Serialize};

use crate::lifecycle::HarvestPolicy;

/// A crop type registered in the catalog together with its harvest policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CropType {
    pub code: i64,
    pub name: String,
    pub policy: HarvestPolicy,
    pub description: Option<String>,
    pub image_ref: Option<String>,
}

/// Input for creating or updating a crop type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CropTypeInput {
    pub name: String,
    pub policy: HarvestPolicy,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl CropTypeInput {
    pub fn new(name: impl Into<String>, policy: HarvestPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            description: None,
            image_ref: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
