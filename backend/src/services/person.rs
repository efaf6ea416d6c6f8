//! Person directory: the identities cultivation management records belong to
//!
//! Login and sessions are handled by the host application; this service
//! only keeps the rows the ledger's `person_id` points at.

use std::str::FromStr;

use bcrypt::hash;
use shared::{normalize_optional_text, require_text, Person, PersonInput, PersonRole};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};

/// Person service for managing identities
#[derive(Clone)]
pub struct PersonService {
    db: SqlitePool,
    bcrypt_cost: u32,
}

#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    id: i64,
    username: String,
    email: Option<String>,
    role: String,
}

impl TryFrom<PersonRow> for Person {
    type Error = AppError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let role = PersonRole::from_str(&row.role).map_err(AppError::Internal)?;
        Ok(Person {
            id: row.id,
            username: row.username,
            email: row.email,
            role,
        })
    }
}

fn duplicate_username(username: &str) -> AppError {
    AppError::DuplicateName {
        kind: "Person".to_string(),
        name: username.to_string(),
    }
}

impl PersonService {
    /// Create a new PersonService instance
    pub fn new(db: SqlitePool, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        hash(password, self.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// List all persons ordered by username
    pub async fn list(&self) -> AppResult<Vec<Person>> {
        let rows = sqlx::query_as::<_, PersonRow>(
            "SELECT id, username, email, role FROM persons ORDER BY username ASC",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Person::try_from).collect()
    }

    /// Get a person by id
    pub async fn get(&self, id: i64) -> AppResult<Person> {
        let row = sqlx::query_as::<_, PersonRow>(
            "SELECT id, username, email, role FROM persons WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Person".to_string()))?;

        Person::try_from(row)
    }

    /// Create a person with the `user` role
    pub async fn create(&self, input: PersonInput) -> AppResult<Person> {
        let username = require_text("username", &input.username)?.to_string();
        require_text("password", &input.password)?;
        let email = normalize_optional_text(input.email);
        let password_hash = self.hash_password(&input.password)?;

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM persons WHERE username = ?")
            .bind(&username)
            .fetch_one(&mut *tx)
            .await?;

        if existing > 0 {
            return Err(duplicate_username(&username));
        }

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO persons (username, email, role, password_hash)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&username)
        .bind(&email)
        .bind(PersonRole::User.as_str())
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::unique_violation_or(e, || duplicate_username(&username)))?;

        tx.commit().await?;

        tracing::info!(id, username = %username, "Person created");

        Ok(Person {
            id,
            username,
            email,
            role: PersonRole::User,
        })
    }

    /// Replace the username, email and password of a person
    ///
    /// The administrator cannot be edited, and the new username must not
    /// belong to anyone else.
    pub async fn update(&self, id: i64, input: PersonInput) -> AppResult<Person> {
        let username = require_text("username", &input.username)?.to_string();
        require_text("password", &input.password)?;
        let email = normalize_optional_text(input.email);

        let person = self.get(id).await?;

        if person.role == PersonRole::Admin {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: "The administrator cannot be edited".to_string(),
                message_es: "No se puede editar el usuario administrador".to_string(),
            });
        }

        let password_hash = self.hash_password(&input.password)?;

        let mut tx = self.db.begin().await?;

        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM persons WHERE username = ? AND id <> ?",
        )
        .bind(&username)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if taken > 0 {
            return Err(duplicate_username(&username));
        }

        sqlx::query("UPDATE persons SET username = ?, email = ?, password_hash = ? WHERE id = ?")
            .bind(&username)
            .bind(&email)
            .bind(&password_hash)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::unique_violation_or(e, || duplicate_username(&username)))?;

        tx.commit().await?;

        tracing::info!(id, username = %username, "Person updated");

        Ok(Person {
            id,
            username,
            email,
            role: person.role,
        })
    }

    /// Delete a person
    ///
    /// Administrators cannot be deleted, nor can persons that still own
    /// cultivation management records.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let person = self.get(id).await?;

        if person.role == PersonRole::Admin {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: "The administrator cannot be deleted".to_string(),
                message_es: "No se puede eliminar el usuario administrador".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let references = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cultivation_management WHERE person_id = ?",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if references > 0 {
            tracing::warn!(id, references, "Refusing to delete person with ledger records");
            return Err(AppError::referenced_by_ledger("Person", id, references));
        }

        sqlx::query("DELETE FROM persons WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(id, "Person deleted");
        Ok(())
    }

    /// Create the administrator if no person with that username exists
    ///
    /// Returns whether a row was inserted. An existing administrator keeps
    /// its credential.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM persons WHERE username = ?")
            .bind(username)
            .fetch_one(&self.db)
            .await?;

        if exists > 0 {
            return Ok(false);
        }

        let password_hash = self.hash_password(password)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO persons (username, email, role, password_hash)
            VALUES (?, NULL, ?, ?)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(PersonRole::Admin.as_str())
        .bind(&password_hash)
        .execute(&self.db)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }
}
