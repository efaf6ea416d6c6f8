//! Crop lifecycle property-based and unit tests
//!
//! Tests for:
//! - Harvest date derivation for both policy kinds
//! - Explicit override precedence
//! - Strict date parsing at the boundary
//! - Case-insensitive policy lookup

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use shared::{
    add_years_clamped, format_date, parse_date, parse_temperature, resolve_schedule, HarvestDates,
    HarvestPolicy, LifecycleError, PolicyTable, ScheduleSource, BUILTIN_CROP_POLICIES,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate sowing dates across several leap cycles
fn sowing_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0..=36_500i64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1980, 1, 1).unwrap() + chrono::Duration::days(offset)
    })
}

/// Generate any harvest policy with realistic offsets
fn policy_strategy() -> impl Strategy<Value = HarvestPolicy> {
    prop_oneof![
        (0..=40u32, 0..=365u32).prop_map(|(years_to_first, days_to_routine)| {
            HarvestPolicy::PerennialFixedYears {
                years_to_first,
                days_to_routine,
            }
        }),
        (0..=730u32, 0..=365u32).prop_map(|(days_to_first, days_to_routine)| {
            HarvestPolicy::AnnualOffsetDays {
                days_to_first,
                days_to_routine,
            }
        }),
    ]
}

/// Generate one of the built-in crop names with random letter case
fn builtin_name_strategy() -> impl Strategy<Value = (String, HarvestPolicy)> {
    (0..BUILTIN_CROP_POLICIES.len(), any::<u64>()).prop_map(|(index, mask)| {
        let (name, policy) = BUILTIN_CROP_POLICIES[index];
        let mixed: String = name
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if mask >> (i % 64) & 1 == 1 {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect();
        (mixed, policy)
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Routine harvest always follows first harvest by the routine offset
    #[test]
    fn prop_routine_follows_first(sown_on in sowing_date_strategy(), policy in policy_strategy()) {
        let schedule = policy.schedule(sown_on).unwrap();

        prop_assert!(schedule.first_harvest_on >= sown_on);
        prop_assert_eq!(
            (schedule.routine_harvest_on - schedule.first_harvest_on).num_days(),
            i64::from(policy.days_to_routine())
        );
        prop_assert_eq!(schedule.source, ScheduleSource::Computed);
    }

    /// Perennial first harvest lands on the same month, and on the same day
    /// unless Feb 29 had to be clamped
    #[test]
    fn prop_perennial_keeps_calendar_position(sown_on in sowing_date_strategy(), years in 0..=40u32) {
        let first = add_years_clamped(sown_on, years).unwrap();

        prop_assert_eq!(first.year(), sown_on.year() + years as i32);
        prop_assert_eq!(first.month(), sown_on.month());
        if sown_on.month() == 2 && sown_on.day() == 29 {
            prop_assert!(first.day() == 29 || first.day() == 28);
        } else {
            prop_assert_eq!(first.day(), sown_on.day());
        }
    }

    /// A complete override pair is returned verbatim, whatever the policy
    #[test]
    fn prop_override_pair_wins(
        sown_on in sowing_date_strategy(),
        first in sowing_date_strategy(),
        routine in sowing_date_strategy(),
        policy in policy_strategy(),
    ) {
        let dates = HarvestDates {
            sown_on,
            first_harvest_on: Some(first),
            routine_harvest_on: Some(routine),
        };
        let schedule = resolve_schedule(&policy, &dates).unwrap();

        prop_assert_eq!(schedule.first_harvest_on, first);
        prop_assert_eq!(schedule.routine_harvest_on, routine);
        prop_assert_eq!(schedule.source, ScheduleSource::Explicit);
    }

    /// Half an override pair is ignored
    #[test]
    fn prop_half_pair_is_ignored(
        sown_on in sowing_date_strategy(),
        first in sowing_date_strategy(),
        policy in policy_strategy(),
    ) {
        let dates = HarvestDates {
            sown_on,
            first_harvest_on: Some(first),
            routine_harvest_on: None,
        };

        prop_assert_eq!(resolve_schedule(&policy, &dates).unwrap(), policy.schedule(sown_on).unwrap());
    }

    /// Formatting then parsing gives back the same date
    #[test]
    fn prop_boundary_dates_are_canonical(date in sowing_date_strategy()) {
        let text = format_date(date);
        prop_assert_eq!(text.len(), 10);
        prop_assert_eq!(parse_date("sown_on", &text).unwrap(), date);
    }

    /// Lookup ignores letter case and surrounding whitespace
    #[test]
    fn prop_lookup_ignores_case((name, policy) in builtin_name_strategy()) {
        let table = PolicyTable::builtin();
        prop_assert_eq!(table.resolve(&name), policy);
        prop_assert_eq!(table.resolve(&format!("  {}\t", name)), policy);
    }

    /// Non-numeric temperatures never fail, they are dropped
    #[test]
    fn prop_temperature_never_fails(text in "[a-zA-Z ]{0,12}") {
        prop_assert_eq!(parse_temperature(Some(&text)), None);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_leap_day_sowing_for_five_year_crop() {
    let sown_on = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let schedule = PolicyTable::builtin().resolve("Limones").schedule(sown_on).unwrap();

    assert_eq!(schedule.first_harvest_on, NaiveDate::from_ymd_opt(2029, 2, 28).unwrap());
}

#[test]
fn test_zero_offsets_harvest_on_sowing_day() {
    let sown_on = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let policy = HarvestPolicy::AnnualOffsetDays {
        days_to_first: 0,
        days_to_routine: 0,
    };
    let schedule = policy.schedule(sown_on).unwrap();

    assert_eq!(schedule.first_harvest_on, sown_on);
    assert_eq!(schedule.routine_harvest_on, sown_on);
}

#[test]
fn test_every_supplied_date_is_validated() {
    let err = HarvestDates::parse(Some("2024-01-10"), Some("soon"), None).unwrap_err();
    assert_eq!(
        err,
        LifecycleError::InvalidDateFormat {
            field: "first_harvest_on",
            value: "soon".to_string(),
        }
    );
}

#[test]
fn test_temperature_parsing() {
    assert_eq!(parse_temperature(Some("18")).map(|t| t.to_string()), Some("18".to_string()));
    assert_eq!(parse_temperature(Some("-3.5")).map(|t| t.to_string()), Some("-3.5".to_string()));
    assert_eq!(parse_temperature(Some("")), None);
    assert_eq!(parse_temperature(None), None);
}
