//! Crop lifecycle rule engine
//!
//! Derives the first and routine harvest dates of a plot from the harvest
//! policy of its crop type and the sowing date. Everything in here is pure;
//! the backend fetches the current policy from the catalog and snapshots the
//! result into the plot record.

use std::collections::HashMap;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;
use crate::validation::{name_key, parse_optional_date};

/// Days between first and routine harvest for the built-in citrus rule
pub const PERENNIAL_ROUTINE_DAYS: u32 = 180;

/// Harvest-timing rule of a crop type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarvestPolicy {
    /// First harvest a whole number of years after sowing (citrus)
    PerennialFixedYears {
        years_to_first: u32,
        days_to_routine: u32,
    },
    /// First harvest a number of days after sowing
    AnnualOffsetDays {
        days_to_first: u32,
        days_to_routine: u32,
    },
}

/// Storage tag of a [`HarvestPolicy`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    PerennialFixedYears,
    AnnualOffsetDays,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::PerennialFixedYears => "perennial_fixed_years",
            PolicyKind::AnnualOffsetDays => "annual_offset_days",
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perennial_fixed_years" => Ok(PolicyKind::PerennialFixedYears),
            "annual_offset_days" => Ok(PolicyKind::AnnualOffsetDays),
            other => Err(format!("Unknown policy kind: {}", other)),
        }
    }
}

impl HarvestPolicy {
    /// Policy applied to crop types the catalog does not know
    pub const FALLBACK: HarvestPolicy = HarvestPolicy::AnnualOffsetDays {
        days_to_first: 80,
        days_to_routine: 20,
    };

    pub fn kind(&self) -> PolicyKind {
        match self {
            HarvestPolicy::PerennialFixedYears { .. } => PolicyKind::PerennialFixedYears,
            HarvestPolicy::AnnualOffsetDays { .. } => PolicyKind::AnnualOffsetDays,
        }
    }

    /// Years to first harvest (perennial policies only)
    pub fn years_to_first(&self) -> Option<u32> {
        match self {
            HarvestPolicy::PerennialFixedYears { years_to_first, .. } => Some(*years_to_first),
            HarvestPolicy::AnnualOffsetDays { .. } => None,
        }
    }

    /// Days to first harvest (annual policies only)
    pub fn days_to_first(&self) -> Option<u32> {
        match self {
            HarvestPolicy::PerennialFixedYears { .. } => None,
            HarvestPolicy::AnnualOffsetDays { days_to_first, .. } => Some(*days_to_first),
        }
    }

    pub fn days_to_routine(&self) -> u32 {
        match self {
            HarvestPolicy::PerennialFixedYears { days_to_routine, .. }
            | HarvestPolicy::AnnualOffsetDays { days_to_routine, .. } => *days_to_routine,
        }
    }

    /// Rebuild a policy from its stored columns
    pub fn from_parts(
        kind: PolicyKind,
        years_to_first: Option<u32>,
        days_to_first: Option<u32>,
        days_to_routine: u32,
    ) -> Option<Self> {
        match kind {
            PolicyKind::PerennialFixedYears => Some(HarvestPolicy::PerennialFixedYears {
                years_to_first: years_to_first?,
                days_to_routine,
            }),
            PolicyKind::AnnualOffsetDays => Some(HarvestPolicy::AnnualOffsetDays {
                days_to_first: days_to_first?,
                days_to_routine,
            }),
        }
    }

    /// Compute the harvest schedule for a sowing date
    pub fn schedule(&self, sown_on: NaiveDate) -> Result<HarvestSchedule, LifecycleError> {
        let first_harvest_on = match self {
            HarvestPolicy::PerennialFixedYears { years_to_first, .. } => {
                add_years_clamped(sown_on, *years_to_first)
            }
            HarvestPolicy::AnnualOffsetDays { days_to_first, .. } => {
                sown_on.checked_add_days(Days::new(u64::from(*days_to_first)))
            }
        }
        .ok_or(LifecycleError::DateOutOfRange {
            field: "first_harvest_on",
        })?;

        let routine_harvest_on = first_harvest_on
            .checked_add_days(Days::new(u64::from(self.days_to_routine())))
            .ok_or(LifecycleError::DateOutOfRange {
                field: "routine_harvest_on",
            })?;

        Ok(HarvestSchedule {
            first_harvest_on,
            routine_harvest_on,
            source: ScheduleSource::Computed,
        })
    }
}

/// Advance a date by whole calendar years
///
/// Feb 29 landing on a non-leap year is clamped to Feb 28.
pub fn add_years_clamped(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(years.checked_mul(12)?))
}

/// Lower-cased, trimmed crop type name used as the policy lookup key
pub fn normalize_crop_name(name: &str) -> String {
    name_key(name)
}

/// Where the dates of a schedule came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    Computed,
    Explicit,
}

/// First and routine harvest dates of a plot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarvestSchedule {
    pub first_harvest_on: NaiveDate,
    pub routine_harvest_on: NaiveDate,
    pub source: ScheduleSource,
}

/// Parsed date fields of a plot form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestDates {
    pub sown_on: NaiveDate,
    pub first_harvest_on: Option<NaiveDate>,
    pub routine_harvest_on: Option<NaiveDate>,
}

impl HarvestDates {
    /// Parse the raw date fields
    ///
    /// Every supplied date is validated before any arithmetic happens, so a
    /// malformed override fails even when it would not be used.
    pub fn parse(
        sown_on: Option<&str>,
        first_harvest_on: Option<&str>,
        routine_harvest_on: Option<&str>,
    ) -> Result<Self, LifecycleError> {
        let sown_on =
            parse_optional_date("sown_on", sown_on)?.ok_or(LifecycleError::MissingSowingDate)?;

        Ok(Self {
            sown_on,
            first_harvest_on: parse_optional_date("first_harvest_on", first_harvest_on)?,
            routine_harvest_on: parse_optional_date("routine_harvest_on", routine_harvest_on)?,
        })
    }

    /// Both overrides, or nothing; half a pair is ignored
    pub fn explicit_pair(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.first_harvest_on.zip(self.routine_harvest_on)
    }

    /// The blank half of an override pair, when exactly one date was given
    pub fn missing_override(&self) -> Option<&'static str> {
        match (self.first_harvest_on, self.routine_harvest_on) {
            (Some(_), None) => Some("routine_harvest_on"),
            (None, Some(_)) => Some("first_harvest_on"),
            _ => None,
        }
    }
}

/// Resolve the harvest schedule of a plot
///
/// An explicit first/routine pair always wins over the policy; otherwise
/// both dates are derived from the policy.
pub fn resolve_schedule(
    policy: &HarvestPolicy,
    dates: &HarvestDates,
) -> Result<HarvestSchedule, LifecycleError> {
    match dates.explicit_pair() {
        Some((first_harvest_on, routine_harvest_on)) => Ok(HarvestSchedule {
            first_harvest_on,
            routine_harvest_on,
            source: ScheduleSource::Explicit,
        }),
        None => policy.schedule(dates.sown_on),
    }
}

/// Crop types seeded into an empty catalog, with their policies
pub const BUILTIN_CROP_POLICIES: [(&str, HarvestPolicy); 7] = [
    (
        "Limones",
        HarvestPolicy::PerennialFixedYears {
            years_to_first: 5,
            days_to_routine: PERENNIAL_ROUTINE_DAYS,
        },
    ),
    (
        "Maize",
        HarvestPolicy::AnnualOffsetDays {
            days_to_first: 90,
            days_to_routine: 30,
        },
    ),
    (
        "Wheat",
        HarvestPolicy::AnnualOffsetDays {
            days_to_first: 120,
            days_to_routine: 30,
        },
    ),
    (
        "Tomato",
        HarvestPolicy::AnnualOffsetDays {
            days_to_first: 70,
            days_to_routine: 15,
        },
    ),
    (
        "Lettuce",
        HarvestPolicy::AnnualOffsetDays {
            days_to_first: 60,
            days_to_routine: 15,
        },
    ),
    (
        "Carrot",
        HarvestPolicy::AnnualOffsetDays {
            days_to_first: 75,
            days_to_routine: 20,
        },
    ),
    (
        "Onion",
        HarvestPolicy::AnnualOffsetDays {
            days_to_first: 100,
            days_to_routine: 20,
        },
    ),
];

/// In-memory policy lookup keyed by normalized crop name
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: HashMap<String, HarvestPolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the built-in seed crops
    pub fn builtin() -> Self {
        BUILTIN_CROP_POLICIES
            .iter()
            .fold(Self::new(), |table, (name, policy)| table.with(name, *policy))
    }

    pub fn with(mut self, name: &str, policy: HarvestPolicy) -> Self {
        self.insert(name, policy);
        self
    }

    pub fn insert(&mut self, name: &str, policy: HarvestPolicy) {
        self.policies.insert(normalize_crop_name(name), policy);
    }

    pub fn get(&self, name: &str) -> Option<&HarvestPolicy> {
        self.policies.get(&normalize_crop_name(name))
    }

    /// Policy for `name`, or [`HarvestPolicy::FALLBACK`] when unknown
    pub fn resolve(&self, name: &str) -> HarvestPolicy {
        self.get(name).copied().unwrap_or(HarvestPolicy::FALLBACK)
    }
}
