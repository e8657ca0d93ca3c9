//! Database operations for the `stores` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use revlens_core::stores::StoreConfig;
use revlens_core::Platform;

use crate::DbError;

/// A row from the `stores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub timezone: Option<String>,
    pub platforms: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Upsert stores from config into the database, keyed by slug.
///
/// Returns the number of stores processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn upsert_stores(pool: &PgPool, stores: &[StoreConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0_usize;

    for store in stores {
        let slug = store.slug();
        let platforms: Vec<String> = store
            .platforms
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        sqlx::query(
            "INSERT INTO stores (slug, name, timezone, platforms, is_active) \
             VALUES ($1, $2, $3, $4, true) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 timezone = EXCLUDED.timezone, \
                 platforms = EXCLUDED.platforms, \
                 is_active = true, \
                 updated_at = NOW()",
        )
        .bind(&slug)
        .bind(&store.name)
        .bind(&store.timezone)
        .bind(&platforms)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

/// List active stores ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stores(pool: &PgPool) -> Result<Vec<StoreRow>, DbError> {
    let rows = sqlx::query_as::<_, StoreRow>(
        "SELECT id, slug, name, timezone, platforms, is_active, created_at \
         FROM stores \
         WHERE is_active = true \
         ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch one store by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such store exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_store(pool: &PgPool, store_id: Uuid) -> Result<StoreRow, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(
        "SELECT id, slug, name, timezone, platforms, is_active, created_at \
         FROM stores \
         WHERE id = $1",
    )
    .bind(store_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Count the reviews stored for one store.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_reviews(pool: &PgPool, store_id: Uuid) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE store_id = $1")
        .bind(store_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert a minimal store for integration tests and return its id.
#[cfg(test)]
pub(crate) async fn test_store(pool: &PgPool, slug: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO stores (slug, name, platforms) \
         VALUES ($1, $2, ARRAY['google']) RETURNING id",
    )
    .bind(slug)
    .bind(format!("Store {slug}"))
    .fetch_one(pool)
    .await
    .expect("insert test store")
}
