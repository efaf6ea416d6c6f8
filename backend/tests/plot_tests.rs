//! Plot registry tests
//!
//! Covers numbering, harvest date derivation through the catalog, explicit
//! overrides, boundary parsing and the snapshot semantics of stored dates.

mod common;

use chrono::NaiveDate;
use crop_lifecycle_backend::services::{CatalogService, PlotService};
use crop_lifecycle_backend::AppError;
use rust_decimal::Decimal;
use shared::{CropTypeInput, HarvestPolicy, PlotInput, ScheduleSource};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_first_plot_gets_number_one() {
    let service = PlotService::new(common::seeded_pool().await);

    let plot = service
        .register(PlotInput::sown("Maize", "2024-01-10"))
        .await
        .unwrap();

    assert_eq!(plot.number, 1);
}

#[tokio::test]
async fn test_numbers_are_consecutive() {
    let service = PlotService::new(common::seeded_pool().await);

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let plot = service
            .register(PlotInput::sown("Wheat", "2024-03-01"))
            .await
            .unwrap();
        numbers.push(plot.number);
    }

    assert_eq!(numbers, vec![1, 2, 3]);

    let plots = service.list().await.unwrap();
    assert_eq!(plots.len(), 3);
    assert!(plots
        .iter()
        .all(|p| p.first_harvest_on == plots[0].first_harvest_on
            && p.routine_harvest_on == plots[0].routine_harvest_on));
}

#[tokio::test]
async fn test_maize_dates() {
    let service = PlotService::new(common::seeded_pool().await);

    let plot = service
        .register(PlotInput::sown("maize", "2024-01-10").with_soil("Loam"))
        .await
        .unwrap();

    assert_eq!(plot.sown_on, date(2024, 1, 10));
    assert_eq!(plot.first_harvest_on, date(2024, 4, 9));
    assert_eq!(plot.routine_harvest_on, date(2024, 5, 9));
    assert_eq!(plot.soil_type_name.as_deref(), Some("Loam"));

    let stored = service.get(plot.number).await.unwrap();
    assert_eq!(stored, plot);
}

#[tokio::test]
async fn test_limones_dates() {
    let service = PlotService::new(common::seeded_pool().await);

    let plot = service
        .register(PlotInput::sown("Limones", "2020-03-01"))
        .await
        .unwrap();

    assert_eq!(plot.first_harvest_on, date(2025, 3, 1));
    assert_eq!(plot.routine_harvest_on, date(2025, 8, 28));
}

#[tokio::test]
async fn test_unknown_crop_uses_fallback() {
    let service = PlotService::new(common::seeded_pool().await);

    let plot = service
        .register(PlotInput::sown("Quinoa", "2024-01-01"))
        .await
        .unwrap();

    assert_eq!(plot.crop_type_name, "Quinoa");
    assert_eq!(plot.first_harvest_on, date(2024, 3, 21));
    assert_eq!(plot.routine_harvest_on, date(2024, 4, 10));
}

#[tokio::test]
async fn test_explicit_dates_win() {
    let service = PlotService::new(common::seeded_pool().await);

    let plot = service
        .register(
            PlotInput::sown("Limones", "2020-03-01").with_harvest_dates("2022-01-15", "2022-07-15"),
        )
        .await
        .unwrap();

    assert_eq!(plot.first_harvest_on, date(2022, 1, 15));
    assert_eq!(plot.routine_harvest_on, date(2022, 7, 15));
}

#[tokio::test]
async fn test_partial_override_is_recomputed() {
    let service = PlotService::new(common::seeded_pool().await);

    let input = PlotInput {
        first_harvest_on: Some("2024-02-01".to_string()),
        ..PlotInput::sown("Maize", "2024-01-10")
    };
    let plot = service.register(input).await.unwrap();

    assert_eq!(plot.first_harvest_on, date(2024, 4, 9));
    assert_eq!(plot.routine_harvest_on, date(2024, 5, 9));
}

// ============================================================================
// Boundary parsing
// ============================================================================

#[tokio::test]
async fn test_invalid_sowing_date_writes_nothing() {
    let pool = common::seeded_pool().await;
    let service = PlotService::new(pool.clone());

    let err = service
        .register(PlotInput::sown("Maize", "10/01/2024"))
        .await
        .unwrap_err();

    match err {
        AppError::InvalidDateFormat { field, value } => {
            assert_eq!(field, "sown_on");
            assert_eq!(value, "10/01/2024");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(common::count_rows(&pool, "plots").await, 0);
}

#[tokio::test]
async fn test_missing_sowing_date_writes_nothing() {
    let pool = common::seeded_pool().await;
    let service = PlotService::new(pool.clone());

    let input = PlotInput {
        crop_type_name: "Maize".to_string(),
        ..Default::default()
    };
    let err = service.register(input).await.unwrap_err();

    assert!(matches!(err, AppError::MissingSowingDate));
    assert_eq!(common::count_rows(&pool, "plots").await, 0);
}

#[tokio::test]
async fn test_malformed_override_is_rejected() {
    let service = PlotService::new(common::seeded_pool().await);

    let err = service
        .register(PlotInput::sown("Maize", "2024-01-10").with_harvest_dates("2024-02-30", "2024-03-01"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidDateFormat { ref field, .. } if field == "first_harvest_on"));
}

#[tokio::test]
async fn test_temperature_is_coerced() {
    let service = PlotService::new(common::seeded_pool().await);

    let warm = service
        .register(PlotInput::sown("Tomato", "2024-05-01").with_temperature(" 24.5 "))
        .await
        .unwrap();
    assert_eq!(warm.temperature, Some(Decimal::new(245, 1)));

    let unreadable = service
        .register(PlotInput::sown("Tomato", "2024-05-01").with_temperature("warm"))
        .await
        .unwrap();
    assert_eq!(unreadable.temperature, None);

    let stored = service.get(unreadable.number).await.unwrap();
    assert_eq!(stored.temperature, None);
}

// ============================================================================
// Editing
// ============================================================================

#[tokio::test]
async fn test_update_recomputes_dates() {
    let service = PlotService::new(common::seeded_pool().await);
    let plot = service
        .register(PlotInput::sown("Maize", "2024-01-10"))
        .await
        .unwrap();

    let updated = service
        .update(plot.number, PlotInput::sown("Lettuce", "2024-02-01").with_soil("Sandy"))
        .await
        .unwrap();

    assert_eq!(updated.number, plot.number);
    assert_eq!(updated.first_harvest_on, date(2024, 4, 1));
    assert_eq!(updated.routine_harvest_on, date(2024, 4, 16));

    let stored = service.get(plot.number).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_update_keeps_explicit_values() {
    let service = PlotService::new(common::seeded_pool().await);
    let plot = service
        .register(PlotInput::sown("Maize", "2024-01-10"))
        .await
        .unwrap();

    let updated = service
        .update(
            plot.number,
            PlotInput::sown("Limones", "2021-05-05")
                .with_harvest_dates("2026-05-05", "2026-11-01")
                .with_soil("Clay")
                .with_temperature("19.5"),
        )
        .await
        .unwrap();

    let stored = service.get(plot.number).await.unwrap();
    assert_eq!(stored, updated);
    assert_eq!(stored.number, plot.number);
    assert_eq!(stored.crop_type_name, "Limones");
    assert_eq!(stored.sown_on, date(2021, 5, 5));
    assert_eq!(stored.first_harvest_on, date(2026, 5, 5));
    assert_eq!(stored.routine_harvest_on, date(2026, 11, 1));
    assert_eq!(stored.soil_type_name.as_deref(), Some("Clay"));
    assert_eq!(stored.temperature, Some(Decimal::new(195, 1)));
}

#[tokio::test]
async fn test_update_with_half_pair_is_rejected() {
    let service = PlotService::new(common::seeded_pool().await);
    let plot = service
        .register(PlotInput::sown("Maize", "2024-01-10"))
        .await
        .unwrap();

    let input = PlotInput {
        first_harvest_on: Some("2024-06-01".to_string()),
        ..PlotInput::sown("Maize", "2024-01-10")
    };
    let err = service.update(plot.number, input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "routine_harvest_on"));

    let input = PlotInput {
        routine_harvest_on: Some("2024-07-01".to_string()),
        ..PlotInput::sown("Maize", "2024-01-10")
    };
    let err = service.update(plot.number, input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "first_harvest_on"));

    assert_eq!(service.get(plot.number).await.unwrap(), plot);
}

#[tokio::test]
async fn test_update_missing_plot_is_not_found() {
    let service = PlotService::new(common::seeded_pool().await);

    let err = service
        .update(42, PlotInput::sown("Maize", "2024-01-10"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_plot() {
    let service = PlotService::new(common::seeded_pool().await);
    let first = service
        .register(PlotInput::sown("Onion", "2024-01-10"))
        .await
        .unwrap();
    let second = service
        .register(PlotInput::sown("Carrot", "2024-01-10"))
        .await
        .unwrap();

    service.delete(first.number).await.unwrap();

    let remaining = service.list().await.unwrap();
    assert_eq!(remaining, vec![second]);

    let err = service.delete(first.number).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_policy_edit_does_not_rewrite_stored_dates() {
    let pool = common::seeded_pool().await;
    let catalog = CatalogService::new(pool.clone());
    let plots = PlotService::new(pool);

    let before = plots
        .register(PlotInput::sown("Maize", "2024-01-10"))
        .await
        .unwrap();

    catalog
        .upsert_crop_type(CropTypeInput::new(
            "Maize",
            HarvestPolicy::AnnualOffsetDays {
                days_to_first: 100,
                days_to_routine: 10,
            },
        ))
        .await
        .unwrap();

    let stored = plots.get(before.number).await.unwrap();
    assert_eq!(stored.first_harvest_on, date(2024, 4, 9));

    let after = plots
        .register(PlotInput::sown("Maize", "2024-01-10"))
        .await
        .unwrap();
    assert_eq!(after.first_harvest_on, date(2024, 4, 19));
    assert_eq!(after.routine_harvest_on, date(2024, 4, 29));
}

// ============================================================================
// Preview
// ============================================================================

#[tokio::test]
async fn test_preview_writes_nothing() {
    let pool = common::seeded_pool().await;
    let service = PlotService::new(pool.clone());

    let preview = service
        .preview(PlotInput::sown("Quinoa", "2024-01-01"))
        .await
        .unwrap();

    assert!(!preview.known_crop_type);
    assert_eq!(preview.policy, HarvestPolicy::FALLBACK);
    assert_eq!(preview.schedule.first_harvest_on, date(2024, 3, 21));
    assert_eq!(preview.schedule.source, ScheduleSource::Computed);
    assert_eq!(common::count_rows(&pool, "plots").await, 0);
}
