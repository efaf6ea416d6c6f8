//! WebAssembly module for the Crop Lifecycle Platform
//!
//! Lets a plot form show harvest dates while the user types, using the
//! built-in crop type policies. The server stays authoritative: a catalog
//! edit changes what it stores but not what this module previews.

use serde::Serialize;
use shared::{resolve_schedule, HarvestDates, HarvestPolicy, HarvestSchedule, PolicyTable};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::lifecycle::*;
pub use shared::validation::*;

/// Harvest dates as returned to JavaScript
#[derive(Debug, Serialize)]
struct Preview {
    crop_type_name: String,
    known_crop_type: bool,
    policy: HarvestPolicy,
    #[serde(flatten)]
    schedule: HarvestSchedule,
}

/// Error body returned to JavaScript
#[derive(Debug, Serialize)]
struct PreviewError {
    code: &'static str,
    field: &'static str,
    message: String,
}

fn preview_json(
    crop_type_name: &str,
    sown_on: Option<&str>,
    first_harvest_on: Option<&str>,
    routine_harvest_on: Option<&str>,
) -> Result<String, String> {
    let to_error = |err: shared::LifecycleError| {
        let code = match err {
            shared::LifecycleError::InvalidDateFormat { .. } => "INVALID_DATE_FORMAT",
            shared::LifecycleError::MissingSowingDate => "MISSING_SOWING_DATE",
            _ => "VALIDATION_ERROR",
        };
        let body = PreviewError {
            code,
            field: err.field(),
            message: err.to_string(),
        };
        serde_json::to_string(&body).unwrap_or_else(|_| err.to_string())
    };

    let dates = HarvestDates::parse(sown_on, first_harvest_on, routine_harvest_on)
        .map_err(to_error)?;

    let table = PolicyTable::builtin();
    let known_crop_type = table.get(crop_type_name).is_some();
    let policy = table.resolve(crop_type_name);
    let schedule = resolve_schedule(&policy, &dates).map_err(to_error)?;

    let preview = Preview {
        crop_type_name: crop_type_name.trim().to_string(),
        known_crop_type,
        policy,
        schedule,
    };

    serde_json::to_string(&preview).map_err(|e| e.to_string())
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"crop lifecycle preview ready".into());
}

/// Preview the harvest dates of a plot form
///
/// Returns the schedule as JSON; errors are JSON with `code`, `field` and
/// `message`.
#[wasm_bindgen]
pub fn preview_harvest_dates(
    crop_type_name: &str,
    sown_on: Option<String>,
    first_harvest_on: Option<String>,
    routine_harvest_on: Option<String>,
) -> Result<String, JsValue> {
    preview_json(
        crop_type_name,
        sown_on.as_deref(),
        first_harvest_on.as_deref(),
        routine_harvest_on.as_deref(),
    )
    .map_err(|e| {
        web_sys::console::warn_1(&e.as_str().into());
        JsValue::from_str(&e)
    })
}

/// Whether a string is a valid `YYYY-MM-DD` date
#[wasm_bindgen]
pub fn is_valid_date(value: &str) -> bool {
    parse_date("date", value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_maize() {
        let json = preview_json("maize", Some("2024-01-10"), None, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["first_harvest_on"], "2024-04-09");
        assert_eq!(value["routine_harvest_on"], "2024-05-09");
        assert_eq!(value["known_crop_type"], true);
        assert_eq!(value["source"], "computed");
    }

    #[test]
    fn test_preview_unknown_crop_uses_fallback() {
        let json = preview_json("Quinoa", Some("2024-01-01"), None, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["known_crop_type"], false);
        assert_eq!(value["first_harvest_on"], "2024-03-21");
        assert_eq!(value["routine_harvest_on"], "2024-04-10");
    }

    #[test]
    fn test_preview_explicit_dates_win() {
        let json = preview_json(
            "Limones",
            Some("2024-03-01"),
            Some("2024-06-01"),
            Some("2024-07-01"),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["first_harvest_on"], "2024-06-01");
        assert_eq!(value["source"], "explicit");
    }

    #[test]
    fn test_preview_errors() {
        let err = preview_json("maize", Some("10/01/2024"), None, None).unwrap_err();
        let value: serde_json::Value = serde_json::from_str(&err).unwrap();
        assert_eq!(value["code"], "INVALID_DATE_FORMAT");
        assert_eq!(value["field"], "sown_on");

        let err = preview_json("maize", Some("  "), None, None).unwrap_err();
        let value: serde_json::Value = serde_json::from_str(&err).unwrap();
        assert_eq!(value["code"], "MISSING_SOWING_DATE");
    }

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date("2024-02-29"));
        assert!(!is_valid_date("2023-02-29"));
        assert!(!is_valid_date("2024-2-9"));
        assert!(!is_valid_date(""));
    }
}
