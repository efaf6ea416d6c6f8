//! Catalog service for crop types, soil types and climates
//!
//! Names are unique per kind regardless of letter case, compared through
//! their `name_key` column. Upserting with the exact stored name updates the
//! row; a name that only differs in case from an existing row is rejected,
//! since case-insensitive lookups would no longer be able to tell the two
//! apart.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    name_key, require_text, BuiltinClimate, CatalogEntry, CatalogInput, CatalogKind, Climate, ClimateInput,
    CropType, CropTypeInput, HarvestPolicy, PolicyKind, PolicyTable, SoilType, SoilTypeInput,
    BUILTIN_CLIMATES, BUILTIN_CROP_POLICIES, BUILTIN_SOIL_TYPES,
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{AppError, AppResult};

/// Catalog service for managing reference entities
#[derive(Clone)]
pub struct CatalogService {
    db: SqlitePool,
}

/// Rows inserted by a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSeedReport {
    pub crop_types: u64,
    pub soil_types: u64,
    pub climates: u64,
}

#[derive(Debug, sqlx::FromRow)]
struct CropTypeRow {
    code: i64,
    name: String,
    policy_kind: String,
    years_to_first: Option<i64>,
    days_to_first: Option<i64>,
    days_to_routine: i64,
    description: Option<String>,
    image_ref: Option<String>,
}

impl TryFrom<CropTypeRow> for CropType {
    type Error = AppError;

    fn try_from(row: CropTypeRow) -> Result<Self, Self::Error> {
        let corrupt = || AppError::Internal(format!("Crop type {} has an invalid policy", row.code));
        let kind = PolicyKind::from_str(&row.policy_kind).map_err(|_| corrupt())?;
        let as_u32 = |v: i64| u32::try_from(v).map_err(|_| corrupt());

        let policy = HarvestPolicy::from_parts(
            kind,
            row.years_to_first.map(as_u32).transpose()?,
            row.days_to_first.map(as_u32).transpose()?,
            as_u32(row.days_to_routine)?,
        )
        .ok_or_else(corrupt)?;

        Ok(CropType {
            code: row.code,
            name: row.name,
            policy,
            description: row.description,
            image_ref: row.image_ref,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClimateRow {
    code: i64,
    name: String,
    reference_temperature: Option<String>,
    description: Option<String>,
    image_ref: Option<String>,
}

impl TryFrom<ClimateRow> for Climate {
    type Error = AppError;

    fn try_from(row: ClimateRow) -> Result<Self, Self::Error> {
        let reference_temperature = row
            .reference_temperature
            .as_deref()
            .map(Decimal::from_str)
            .transpose()
            .map_err(|_| {
                AppError::Internal(format!("Climate {} has an invalid temperature", row.code))
            })?;

        Ok(Climate {
            code: row.code,
            name: row.name,
            reference_temperature,
            description: row.description,
            image_ref: row.image_ref,
        })
    }
}

const CROP_TYPE_COLUMNS: &str = "code, name, policy_kind, years_to_first, days_to_first, \
                                 days_to_routine, description, image_ref";

/// Table backing a catalog kind
fn table_name(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::CropType => "crop_types",
        CatalogKind::SoilType => "soil_types",
        CatalogKind::Climate => "climates",
    }
}

/// Ledger column that references a catalog kind
fn ledger_column(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::CropType => "crop_type_code",
        CatalogKind::SoilType => "soil_type_code",
        CatalogKind::Climate => "climate_code",
    }
}

/// Find the row an upsert of `name` should update
///
/// Returns `None` when the name is new.
async fn upsert_target(
    conn: &mut SqliteConnection,
    kind: CatalogKind,
    name: &str,
) -> AppResult<Option<i64>> {
    let existing = sqlx::query_as::<_, (i64, String)>(&format!(
        "SELECT code, name FROM {} WHERE name_key = ?",
        table_name(kind)
    ))
    .bind(name_key(name))
    .fetch_optional(&mut *conn)
    .await?;

    match existing {
        Some((code, stored)) if stored == name => Ok(Some(code)),
        Some((code, stored)) => {
            tracing::warn!(%kind, code, stored = %stored, requested = %name, "Catalog name differs only in case");
            Err(AppError::duplicate_name(kind, &stored))
        }
        None => Ok(None),
    }
}

/// Error for an insert that lost a race on `name_key`
fn insert_conflict(kind: CatalogKind, name: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |err| AppError::unique_violation_or(err, || AppError::duplicate_name(kind, name))
}

/// Whether a catalog table has no rows at all
async fn is_empty(conn: &mut SqliteConnection, kind: CatalogKind) -> AppResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table_name(kind)))
        .fetch_one(&mut *conn)
        .await?;
    Ok(count == 0)
}

/// Load every crop type policy into a lookup table
pub(crate) async fn load_policy_table(conn: &mut SqliteConnection) -> AppResult<PolicyTable> {
    let rows = sqlx::query_as::<_, CropTypeRow>(&format!(
        "SELECT {} FROM crop_types",
        CROP_TYPE_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;

    let mut table = PolicyTable::new();
    for row in rows {
        let crop_type = CropType::try_from(row)?;
        table.insert(&crop_type.name, crop_type.policy);
    }
    Ok(table)
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Generic operations
    // ========================================================================

    /// List all entries of a kind, ordered by name
    pub async fn list(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>> {
        Ok(match kind {
            CatalogKind::CropType => self
                .list_crop_types()
                .await?
                .into_iter()
                .map(CatalogEntry::CropType)
                .collect(),
            CatalogKind::SoilType => self
                .list_soil_types()
                .await?
                .into_iter()
                .map(CatalogEntry::SoilType)
                .collect(),
            CatalogKind::Climate => self
                .list_climates()
                .await?
                .into_iter()
                .map(CatalogEntry::Climate)
                .collect(),
        })
    }

    /// Get an entry by name (case-insensitive)
    pub async fn get_by_name(&self, kind: CatalogKind, name: &str) -> AppResult<CatalogEntry> {
        Ok(match kind {
            CatalogKind::CropType => CatalogEntry::CropType(self.get_crop_type_by_name(name).await?),
            CatalogKind::SoilType => CatalogEntry::SoilType(self.get_soil_type_by_name(name).await?),
            CatalogKind::Climate => CatalogEntry::Climate(self.get_climate_by_name(name).await?),
        })
    }

    /// Insert or update an entry by name
    pub async fn upsert(&self, input: CatalogInput) -> AppResult<CatalogEntry> {
        Ok(match input {
            CatalogInput::CropType(input) => CatalogEntry::CropType(self.upsert_crop_type(input).await?),
            CatalogInput::SoilType(input) => CatalogEntry::SoilType(self.upsert_soil_type(input).await?),
            CatalogInput::Climate(input) => CatalogEntry::Climate(self.upsert_climate(input).await?),
        })
    }

    /// Delete an entry by code
    ///
    /// Rejected while cultivation management records reference it. Plots
    /// only store names and are not checked.
    pub async fn delete(&self, kind: CatalogKind, code: i64) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {} WHERE code = ?",
            table_name(kind)
        ))
        .bind(code)
        .fetch_one(&mut *tx)
        .await?;

        if exists == 0 {
            return Err(AppError::not_found(kind));
        }

        let references = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM cultivation_management WHERE {} = ?",
            ledger_column(kind)
        ))
        .bind(code)
        .fetch_one(&mut *tx)
        .await?;

        if references > 0 {
            tracing::warn!(%kind, code, references, "Refusing to delete catalog entry still in use");
            return Err(AppError::referenced_by_ledger(kind.label(), code, references));
        }

        sqlx::query(&format!("DELETE FROM {} WHERE code = ?", table_name(kind)))
            .bind(code)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%kind, code, "Catalog entry deleted");
        Ok(())
    }

    // ========================================================================
    // Crop types
    // ========================================================================

    pub async fn list_crop_types(&self) -> AppResult<Vec<CropType>> {
        let rows = sqlx::query_as::<_, CropTypeRow>(&format!(
            "SELECT {} FROM crop_types ORDER BY name_key ASC",
            CROP_TYPE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(CropType::try_from).collect()
    }

    pub async fn get_crop_type_by_name(&self, name: &str) -> AppResult<CropType> {
        let row = sqlx::query_as::<_, CropTypeRow>(&format!(
            "SELECT {} FROM crop_types WHERE name_key = ?",
            CROP_TYPE_COLUMNS
        ))
        .bind(name_key(name))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found(CatalogKind::CropType))?;

        CropType::try_from(row)
    }

    pub async fn upsert_crop_type(&self, input: CropTypeInput) -> AppResult<CropType> {
        let name = require_text("name", &input.name)?;
        let policy = input.policy;

        let mut tx = self.db.begin().await?;

        let code = match upsert_target(&mut *tx, CatalogKind::CropType, name).await? {
            Some(code) => {
                sqlx::query(
                    r#"
                    UPDATE crop_types
                    SET policy_kind = ?, years_to_first = ?, days_to_first = ?,
                        days_to_routine = ?, description = ?, image_ref = ?
                    WHERE code = ?
                    "#,
                )
                .bind(policy.kind().as_str())
                .bind(policy.years_to_first().map(i64::from))
                .bind(policy.days_to_first().map(i64::from))
                .bind(i64::from(policy.days_to_routine()))
                .bind(&input.description)
                .bind(&input.image_ref)
                .bind(code)
                .execute(&mut *tx)
                .await?;
                code
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO crop_types (name, name_key, policy_kind, years_to_first,
                                            days_to_first, days_to_routine, description, image_ref)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    RETURNING code
                    "#,
                )
                .bind(name)
                .bind(name_key(name))
                .bind(policy.kind().as_str())
                .bind(policy.years_to_first().map(i64::from))
                .bind(policy.days_to_first().map(i64::from))
                .bind(i64::from(policy.days_to_routine()))
                .bind(&input.description)
                .bind(&input.image_ref)
                .fetch_one(&mut *tx)
                .await
                .map_err(insert_conflict(CatalogKind::CropType, name))?
            }
        };

        tx.commit().await?;

        tracing::info!(code, name, kind = policy.kind().as_str(), "Crop type saved");

        Ok(CropType {
            code,
            name: name.to_string(),
            policy,
            description: input.description,
            image_ref: input.image_ref,
        })
    }

    pub async fn delete_crop_type(&self, code: i64) -> AppResult<()> {
        self.delete(CatalogKind::CropType, code).await
    }

    // ========================================================================
    // Soil types
    // ========================================================================

    pub async fn list_soil_types(&self) -> AppResult<Vec<SoilType>> {
        let soil_types = sqlx::query_as::<_, (i64, String, Option<String>, Option<String>)>(
            "SELECT code, name, description, image_ref FROM soil_types ORDER BY name_key ASC",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(code, name, description, image_ref)| SoilType {
            code,
            name,
            description,
            image_ref,
        })
        .collect();

        Ok(soil_types)
    }

    pub async fn get_soil_type_by_name(&self, name: &str) -> AppResult<SoilType> {
        let (code, name, description, image_ref) =
            sqlx::query_as::<_, (i64, String, Option<String>, Option<String>)>(
                "SELECT code, name, description, image_ref FROM soil_types WHERE name_key = ?",
            )
            .bind(name_key(name))
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(CatalogKind::SoilType))?;

        Ok(SoilType {
            code,
            name,
            description,
            image_ref,
        })
    }

    pub async fn upsert_soil_type(&self, input: SoilTypeInput) -> AppResult<SoilType> {
        let name = require_text("name", &input.name)?;

        let mut tx = self.db.begin().await?;

        let code = match upsert_target(&mut *tx, CatalogKind::SoilType, name).await? {
            Some(code) => {
                sqlx::query("UPDATE soil_types SET description = ?, image_ref = ? WHERE code = ?")
                    .bind(&input.description)
                    .bind(&input.image_ref)
                    .bind(code)
                    .execute(&mut *tx)
                    .await?;
                code
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO soil_types (name, name_key, description, image_ref)
                    VALUES (?, ?, ?, ?)
                    RETURNING code
                    "#,
                )
                .bind(name)
                .bind(name_key(name))
                .bind(&input.description)
                .bind(&input.image_ref)
                .fetch_one(&mut *tx)
                .await
                .map_err(insert_conflict(CatalogKind::SoilType, name))?
            }
        };

        tx.commit().await?;

        tracing::info!(code, name, "Soil type saved");

        Ok(SoilType {
            code,
            name: name.to_string(),
            description: input.description,
            image_ref: input.image_ref,
        })
    }

    pub async fn delete_soil_type(&self, code: i64) -> AppResult<()> {
        self.delete(CatalogKind::SoilType, code).await
    }

    // ========================================================================
    // Climates
    // ========================================================================

    pub async fn list_climates(&self) -> AppResult<Vec<Climate>> {
        let rows = sqlx::query_as::<_, ClimateRow>(
            r#"
            SELECT code, name, reference_temperature, description, image_ref
            FROM climates
            ORDER BY name_key ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Climate::try_from).collect()
    }

    pub async fn get_climate_by_name(&self, name: &str) -> AppResult<Climate> {
        let row = sqlx::query_as::<_, ClimateRow>(
            r#"
            SELECT code, name, reference_temperature, description, image_ref
            FROM climates
            WHERE name_key = ?
            "#,
        )
        .bind(name_key(name))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found(CatalogKind::Climate))?;

        Climate::try_from(row)
    }

    pub async fn upsert_climate(&self, input: ClimateInput) -> AppResult<Climate> {
        let name = require_text("name", &input.name)?;
        let reference_temperature = input.reference_temperature.map(|t| t.to_string());

        let mut tx = self.db.begin().await?;

        let code = match upsert_target(&mut *tx, CatalogKind::Climate, name).await? {
            Some(code) => {
                sqlx::query(
                    r#"
                    UPDATE climates
                    SET reference_temperature = ?, description = ?, image_ref = ?
                    WHERE code = ?
                    "#,
                )
                .bind(&reference_temperature)
                .bind(&input.description)
                .bind(&input.image_ref)
                .bind(code)
                .execute(&mut *tx)
                .await?;
                code
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO climates (name, name_key, reference_temperature, description, image_ref)
                    VALUES (?, ?, ?, ?, ?)
                    RETURNING code
                    "#,
                )
                .bind(name)
                .bind(name_key(name))
                .bind(&reference_temperature)
                .bind(&input.description)
                .bind(&input.image_ref)
                .fetch_one(&mut *tx)
                .await
                .map_err(insert_conflict(CatalogKind::Climate, name))?
            }
        };

        tx.commit().await?;

        tracing::info!(code, name, "Climate saved");

        Ok(Climate {
            code,
            name: name.to_string(),
            reference_temperature: input.reference_temperature,
            description: input.description,
            image_ref: input.image_ref,
        })
    }

    pub async fn delete_climate(&self, code: i64) -> AppResult<()> {
        self.delete(CatalogKind::Climate, code).await
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Insert the built-in rows into every catalog that is still empty
    ///
    /// A catalog with at least one row is left alone, so entries an
    /// administrator deleted stay deleted across restarts.
    pub async fn seed_defaults(&self) -> AppResult<CatalogSeedReport> {
        let mut report = CatalogSeedReport::default();
        let mut tx = self.db.begin().await?;

        if is_empty(&mut *tx, CatalogKind::CropType).await? {
            for (name, policy) in BUILTIN_CROP_POLICIES {
                report.crop_types += sqlx::query(
                    r#"
                    INSERT INTO crop_types (name, name_key, policy_kind, years_to_first,
                                            days_to_first, days_to_routine)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(name)
                .bind(name_key(name))
                .bind(policy.kind().as_str())
                .bind(policy.years_to_first().map(i64::from))
                .bind(policy.days_to_first().map(i64::from))
                .bind(i64::from(policy.days_to_routine()))
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
        }

        if is_empty(&mut *tx, CatalogKind::SoilType).await? {
            for (name, description) in BUILTIN_SOIL_TYPES {
                report.soil_types += sqlx::query(
                    "INSERT INTO soil_types (name, name_key, description) VALUES (?, ?, ?)",
                )
                .bind(name)
                .bind(name_key(name))
                .bind(description)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
        }

        if is_empty(&mut *tx, CatalogKind::Climate).await? {
            for BuiltinClimate {
                name,
                reference_temperature,
                description,
            } in BUILTIN_CLIMATES
            {
                report.climates += sqlx::query(
                    r#"
                    INSERT INTO climates (name, name_key, reference_temperature, description)
                    VALUES (?, ?, ?, ?)
                    "#,
                )
                .bind(name)
                .bind(name_key(name))
                .bind(reference_temperature.to_string())
                .bind(description)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
        }

        tx.commit().await?;
        Ok(report)
    }
}
