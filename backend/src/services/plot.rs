//! Plot registry: registration, editing and lookup of hectares

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    normalize_optional_text, parse_temperature, require_text, resolve_schedule, HarvestDates,
    HarvestPolicy, HarvestSchedule, Plot, PlotInput,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::catalog::load_policy_table;
use crate::error::{AppError, AppResult};

/// Plot service for managing registered plots
#[derive(Clone)]
pub struct PlotService {
    db: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct PlotRow {
    number: i64,
    crop_type_name: String,
    sown_on: NaiveDate,
    first_harvest_on: NaiveDate,
    routine_harvest_on: NaiveDate,
    soil_type_name: Option<String>,
    temperature: Option<String>,
}

impl From<PlotRow> for Plot {
    fn from(row: PlotRow) -> Self {
        Plot {
            number: row.number,
            crop_type_name: row.crop_type_name,
            sown_on: row.sown_on,
            first_harvest_on: row.first_harvest_on,
            routine_harvest_on: row.routine_harvest_on,
            soil_type_name: row.soil_type_name,
            temperature: row
                .temperature
                .as_deref()
                .and_then(|t| Decimal::from_str(t).ok()),
        }
    }
}

/// Validated plot fields, ready to be written
#[derive(Debug)]
struct PlotFields {
    crop_type_name: String,
    dates: HarvestDates,
    soil_type_name: Option<String>,
    temperature: Option<Decimal>,
}

impl PlotFields {
    /// Validate raw form values without touching the database
    fn parse(input: PlotInput) -> AppResult<Self> {
        let crop_type_name = require_text("crop_type_name", &input.crop_type_name)?.to_string();
        let dates = HarvestDates::parse(
            input.sown_on.as_deref(),
            input.first_harvest_on.as_deref(),
            input.routine_harvest_on.as_deref(),
        )?;

        Ok(Self {
            crop_type_name,
            dates,
            soil_type_name: normalize_optional_text(input.soil_type_name),
            temperature: parse_temperature(input.temperature.as_deref()),
        })
    }
}

/// Harvest dates a plot would get, without registering it
#[derive(Debug, Clone, Serialize)]
pub struct SchedulePreview {
    pub crop_type_name: String,
    pub sown_on: NaiveDate,
    /// Whether the crop type was found in the catalog
    pub known_crop_type: bool,
    pub policy: HarvestPolicy,
    #[serde(flatten)]
    pub schedule: HarvestSchedule,
}

const PLOT_COLUMNS: &str = "number, crop_type_name, sown_on, first_harvest_on, routine_harvest_on, \
                            soil_type_name, temperature";

impl PlotService {
    /// Create a new PlotService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Current policy of a crop type, or the fallback when the catalog does
    /// not know it
    async fn current_policy(
        conn: &mut SqliteConnection,
        crop_type_name: &str,
    ) -> AppResult<(HarvestPolicy, bool)> {
        let table = load_policy_table(conn).await?;

        Ok(match table.get(crop_type_name) {
            Some(policy) => (*policy, true),
            None => {
                tracing::debug!(
                    crop_type = %crop_type_name,
                    "Unknown crop type, using fallback harvest policy"
                );
                (HarvestPolicy::FALLBACK, false)
            }
        })
    }

    async fn schedule_for(
        conn: &mut SqliteConnection,
        fields: &PlotFields,
    ) -> AppResult<HarvestSchedule> {
        let (policy, _) = Self::current_policy(conn, &fields.crop_type_name).await?;
        Ok(resolve_schedule(&policy, &fields.dates)?)
    }

    /// Get all plots in registration order
    pub async fn list(&self) -> AppResult<Vec<Plot>> {
        let rows = sqlx::query_as::<_, PlotRow>(&format!(
            "SELECT {} FROM plots ORDER BY id ASC",
            PLOT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Plot::from).collect())
    }

    /// Get a plot by number
    pub async fn get(&self, number: i64) -> AppResult<Plot> {
        let row = sqlx::query_as::<_, PlotRow>(&format!(
            "SELECT {} FROM plots WHERE number = ?",
            PLOT_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plot".to_string()))?;

        Ok(row.into())
    }

    /// Register a new plot
    ///
    /// The plot gets the next free number. Harvest dates come from an
    /// explicit first/routine pair when both are given, otherwise from the
    /// crop type's current policy.
    pub async fn register(&self, input: PlotInput) -> AppResult<Plot> {
        let fields = PlotFields::parse(input)?;

        let mut tx = self.db.begin().await?;

        let schedule = Self::schedule_for(&mut *tx, &fields).await?;

        // Numbering and insert share one statement so no writer can claim the
        // same number in between
        let number = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO plots (number, crop_type_name, sown_on, first_harvest_on,
                               routine_harvest_on, soil_type_name, temperature)
            SELECT COALESCE(MAX(number), 0) + 1, ?, ?, ?, ?, ?, ?
            FROM plots
            RETURNING number
            "#,
        )
        .bind(&fields.crop_type_name)
        .bind(fields.dates.sown_on)
        .bind(schedule.first_harvest_on)
        .bind(schedule.routine_harvest_on)
        .bind(&fields.soil_type_name)
        .bind(fields.temperature.map(|t| t.to_string()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            number,
            crop_type = %fields.crop_type_name,
            first_harvest_on = %schedule.first_harvest_on,
            routine_harvest_on = %schedule.routine_harvest_on,
            "Plot registered"
        );

        Ok(Plot {
            number,
            crop_type_name: fields.crop_type_name,
            sown_on: fields.dates.sown_on,
            first_harvest_on: schedule.first_harvest_on,
            routine_harvest_on: schedule.routine_harvest_on,
            soil_type_name: fields.soil_type_name,
            temperature: fields.temperature,
        })
    }

    /// Replace every field of an existing plot
    ///
    /// A full first/routine pair is stored verbatim and both dates blank are
    /// recomputed from the crop type's current policy. Unlike registration,
    /// half a pair is rejected rather than overwritten.
    pub async fn update(&self, number: i64, input: PlotInput) -> AppResult<Plot> {
        let fields = PlotFields::parse(input)?;

        if let Some(field) = fields.dates.missing_override() {
            return Err(AppError::Validation {
                field: field.to_string(),
                message: "Give both harvest dates, or leave both blank to recompute them"
                    .to_string(),
                message_es: "Ingrese ambas fechas de cosecha o deje ambas en blanco para recalcularlas"
                    .to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM plots WHERE number = ?")
            .bind(number)
            .fetch_one(&mut *tx)
            .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Plot".to_string()));
        }

        let schedule = Self::schedule_for(&mut *tx, &fields).await?;

        sqlx::query(
            r#"
            UPDATE plots
            SET crop_type_name = ?, sown_on = ?, first_harvest_on = ?,
                routine_harvest_on = ?, soil_type_name = ?, temperature = ?
            WHERE number = ?
            "#,
        )
        .bind(&fields.crop_type_name)
        .bind(fields.dates.sown_on)
        .bind(schedule.first_harvest_on)
        .bind(schedule.routine_harvest_on)
        .bind(&fields.soil_type_name)
        .bind(fields.temperature.map(|t| t.to_string()))
        .bind(number)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(number, source = ?schedule.source, "Plot updated");

        Ok(Plot {
            number,
            crop_type_name: fields.crop_type_name,
            sown_on: fields.dates.sown_on,
            first_harvest_on: schedule.first_harvest_on,
            routine_harvest_on: schedule.routine_harvest_on,
            soil_type_name: fields.soil_type_name,
            temperature: fields.temperature,
        })
    }

    /// Delete a plot
    pub async fn delete(&self, number: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM plots WHERE number = ?")
            .bind(number)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Plot".to_string()));
        }

        tracing::info!(number, "Plot deleted");
        Ok(())
    }

    /// Compute the harvest dates a registration would store
    pub async fn preview(&self, input: PlotInput) -> AppResult<SchedulePreview> {
        let fields = PlotFields::parse(input)?;

        let mut conn = self.db.acquire().await?;
        let (policy, known_crop_type) =
            Self::current_policy(&mut *conn, &fields.crop_type_name).await?;
        let schedule = resolve_schedule(&policy, &fields.dates)?;

        Ok(SchedulePreview {
            crop_type_name: fields.crop_type_name,
            sown_on: fields.dates.sown_on,
            known_crop_type,
            policy,
            schedule,
        })
    }
}
