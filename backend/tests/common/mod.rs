//! Shared setup for integration tests

use crop_lifecycle_backend::{config::SeedConfig, db};
use sqlx::SqlitePool;

/// bcrypt's minimum work factor (the crate keeps its own `MIN_COST` private)
#[allow(dead_code)]
pub const BCRYPT_MIN_COST: u32 = 4;

/// Fresh in-memory store with migrations and default rows applied
pub async fn seeded_pool() -> SqlitePool {
    let pool = empty_pool().await;
    db::seed(&pool, &SeedConfig::default(), BCRYPT_MIN_COST)
        .await
        .expect("seed in-memory database");
    pool
}

/// Fresh in-memory store with migrations applied and no rows
pub async fn empty_pool() -> SqlitePool {
    let pool = db::connect_in_memory()
        .await
        .expect("open in-memory database");
    db::migrate(&pool).await.expect("run migrations");
    pool
}

/// Number of rows in a table
#[allow(dead_code)]
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count rows")
}
