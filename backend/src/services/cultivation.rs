//! Cultivation management ledger
//!
//! Unlike plots, ledger records hold real foreign keys: every write checks
//! that the person, crop type, soil type and climate exist.

use shared::{normalize_optional_text, CultivationInput, CultivationRecord, CultivationView};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{AppError, AppResult};

/// Cultivation management service
#[derive(Clone)]
pub struct CultivationService {
    db: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct CultivationRow {
    code: i64,
    person_id: i64,
    crop_type_code: i64,
    soil_type_code: i64,
    climate_code: i64,
    video_ref: Option<String>,
    observations: Option<String>,
}

impl From<CultivationRow> for CultivationRecord {
    fn from(row: CultivationRow) -> Self {
        CultivationRecord {
            code: row.code,
            person_id: row.person_id,
            crop_type_code: row.crop_type_code,
            soil_type_code: row.soil_type_code,
            climate_code: row.climate_code,
            video_ref: row.video_ref,
            observations: row.observations,
        }
    }
}

/// Database row for a record joined with its referenced names
#[derive(Debug, sqlx::FromRow)]
struct CultivationViewRow {
    #[sqlx(flatten)]
    record: CultivationRow,
    person_username: String,
    crop_type_name: String,
    soil_type_name: String,
    climate_name: String,
}

/// A foreign key that does not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
struct MissingReference {
    field: &'static str,
    id: i64,
}

const CULTIVATION_COLUMNS: &str =
    "code, person_id, crop_type_code, soil_type_code, climate_code, video_ref, observations";

/// First foreign key of `input` that does not resolve, if any
async fn missing_reference(
    conn: &mut SqliteConnection,
    input: &CultivationInput,
) -> AppResult<Option<MissingReference>> {
    let checks = [
        ("person_id", "SELECT COUNT(*) FROM persons WHERE id = ?", input.person_id),
        ("crop_type_code", "SELECT COUNT(*) FROM crop_types WHERE code = ?", input.crop_type_code),
        ("soil_type_code", "SELECT COUNT(*) FROM soil_types WHERE code = ?", input.soil_type_code),
        ("climate_code", "SELECT COUNT(*) FROM climates WHERE code = ?", input.climate_code),
    ];

    for (field, query, id) in checks {
        let count = sqlx::query_scalar::<_, i64>(query)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        if count == 0 {
            return Ok(Some(MissingReference { field, id }));
        }
    }

    Ok(None)
}

/// Reject the write when a foreign key does not resolve
async fn ensure_references(conn: &mut SqliteConnection, input: &CultivationInput) -> AppResult<()> {
    match missing_reference(conn, input).await? {
        Some(MissingReference { field, id }) => {
            tracing::warn!(field, id, "Rejecting cultivation record with dangling reference");
            Err(AppError::DanglingReference {
                field: field.to_string(),
                id,
            })
        }
        None => Ok(()),
    }
}

impl CultivationService {
    /// Create a new CultivationService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Get a record by code
    pub async fn get(&self, code: i64) -> AppResult<CultivationRecord> {
        let row = sqlx::query_as::<_, CultivationRow>(&format!(
            "SELECT {} FROM cultivation_management WHERE code = ?",
            CULTIVATION_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Cultivation record".to_string()))?;

        Ok(row.into())
    }

    /// List every record together with the names its keys resolve to
    pub async fn list_joined(&self) -> AppResult<Vec<CultivationView>> {
        let rows = sqlx::query_as::<_, CultivationViewRow>(
            r#"
            SELECT cm.code, cm.person_id, cm.crop_type_code, cm.soil_type_code,
                   cm.climate_code, cm.video_ref, cm.observations,
                   p.username AS person_username,
                   ct.name AS crop_type_name,
                   st.name AS soil_type_name,
                   c.name AS climate_name
            FROM cultivation_management cm
            JOIN persons p ON p.id = cm.person_id
            JOIN crop_types ct ON ct.code = cm.crop_type_code
            JOIN soil_types st ON st.code = cm.soil_type_code
            JOIN climates c ON c.code = cm.climate_code
            ORDER BY cm.code ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CultivationView {
                record: row.record.into(),
                person_username: row.person_username,
                crop_type_name: row.crop_type_name,
                soil_type_name: row.soil_type_name,
                climate_name: row.climate_name,
            })
            .collect())
    }

    /// Create a record
    pub async fn create(&self, input: CultivationInput) -> AppResult<CultivationRecord> {
        let video_ref = normalize_optional_text(input.video_ref.clone());
        let observations = normalize_optional_text(input.observations.clone());

        let mut tx = self.db.begin().await?;

        ensure_references(&mut *tx, &input).await?;

        let code = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO cultivation_management (person_id, crop_type_code, soil_type_code,
                                                climate_code, video_ref, observations)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING code
            "#,
        )
        .bind(input.person_id)
        .bind(input.crop_type_code)
        .bind(input.soil_type_code)
        .bind(input.climate_code)
        .bind(&video_ref)
        .bind(&observations)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(code, person_id = input.person_id, "Cultivation record created");

        Ok(CultivationRecord {
            code,
            person_id: input.person_id,
            crop_type_code: input.crop_type_code,
            soil_type_code: input.soil_type_code,
            climate_code: input.climate_code,
            video_ref,
            observations,
        })
    }

    /// Replace every field of a record
    pub async fn update(&self, code: i64, input: CultivationInput) -> AppResult<CultivationRecord> {
        let video_ref = normalize_optional_text(input.video_ref.clone());
        let observations = normalize_optional_text(input.observations.clone());

        let mut tx = self.db.begin().await?;

        let exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cultivation_management WHERE code = ?")
                .bind(code)
                .fetch_one(&mut *tx)
                .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Cultivation record".to_string()));
        }

        ensure_references(&mut *tx, &input).await?;

        sqlx::query(
            r#"
            UPDATE cultivation_management
            SET person_id = ?, crop_type_code = ?, soil_type_code = ?, climate_code = ?,
                video_ref = ?, observations = ?
            WHERE code = ?
            "#,
        )
        .bind(input.person_id)
        .bind(input.crop_type_code)
        .bind(input.soil_type_code)
        .bind(input.climate_code)
        .bind(&video_ref)
        .bind(&observations)
        .bind(code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(code, "Cultivation record updated");

        Ok(CultivationRecord {
            code,
            person_id: input.person_id,
            crop_type_code: input.crop_type_code,
            soil_type_code: input.soil_type_code,
            climate_code: input.climate_code,
            video_ref,
            observations,
        })
    }

    /// Delete a record
    pub async fn delete(&self, code: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM cultivation_management WHERE code = ?")
            .bind(code)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cultivation record".to_string()));
        }

        tracing::info!(code, "Cultivation record deleted");
        Ok(())
    }
}
