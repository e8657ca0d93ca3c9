//! Database operations for the `reviews` table.
//!
//! Rows are mapped into [`Review`] at the boundary; records that fail the
//! domain contract (rating outside 1..=5, unknown enum strings) are
//! skipped with a warning rather than clamped, so aggregates never see
//! distorted values.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use revlens_core::{validate_rating, Platform, Review, ReviewStatus, Sentiment};

use crate::DbError;

const REVIEW_COLUMNS: &str = "id, store_id, platform, rating, content, author, posted_at, \
     status, sentiment, is_urgent, response_content, responded_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `reviews` table, before domain validation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub store_id: Uuid,
    pub platform: String,
    pub rating: i16,
    pub content: String,
    pub author: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub status: String,
    pub sentiment: String,
    pub is_urgent: bool,
    pub response_content: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl ReviewRow {
    /// Map a raw row into the domain type, or `None` if it violates the
    /// field contract. The schema CHECK constraints make this a backstop,
    /// not the primary guard.
    fn into_domain(self) -> Option<Review> {
        let Some(rating) = validate_rating(self.rating) else {
            tracing::warn!(review_id = %self.id, rating = self.rating, "skipping review with out-of-range rating");
            return None;
        };
        let Some(platform) = Platform::parse(&self.platform) else {
            tracing::warn!(review_id = %self.id, platform = %self.platform, "skipping review with unknown platform");
            return None;
        };
        let Some(status) = ReviewStatus::parse(&self.status) else {
            tracing::warn!(review_id = %self.id, status = %self.status, "skipping review with unknown status");
            return None;
        };
        let Some(sentiment) = Sentiment::parse(&self.sentiment) else {
            tracing::warn!(review_id = %self.id, sentiment = %self.sentiment, "skipping review with unknown sentiment");
            return None;
        };

        Some(Review {
            id: self.id,
            store_id: self.store_id,
            platform,
            rating,
            content: self.content,
            author: self.author,
            posted_at: self.posted_at,
            status,
            sentiment,
            is_urgent: self.is_urgent,
            response_content: self.response_content,
            responded_at: self.responded_at,
        })
    }
}

fn rows_into_reviews(rows: Vec<ReviewRow>) -> Vec<Review> {
    rows.into_iter().filter_map(ReviewRow::into_domain).collect()
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Optional list filters; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewFilter {
    pub status: Option<ReviewStatus>,
    pub platform: Option<Platform>,
}

/// Fields for inserting a review (seeding and tests).
#[derive(Debug, Clone)]
pub struct NewReview {
    pub store_id: Uuid,
    pub platform: Platform,
    pub rating: u8,
    pub content: String,
    pub author: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub status: ReviewStatus,
    pub sentiment: Sentiment,
    pub is_urgent: bool,
    pub response_content: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// List reviews for a store, newest first, with optional status/platform
/// filters and a limit.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews(
    pool: &PgPool,
    store_id: Uuid,
    filter: ReviewFilter,
    limit: i64,
) -> Result<Vec<Review>, DbError> {
    let sql = format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews \
         WHERE store_id = $1 \
           AND ($2::text IS NULL OR status = $2) \
           AND ($3::text IS NULL OR platform = $3) \
         ORDER BY posted_at DESC, id DESC \
         LIMIT $4"
    );
    let rows = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(store_id)
        .bind(filter.status.map(ReviewStatus::as_str))
        .bind(filter.platform.map(Platform::as_str))
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows_into_reviews(rows))
}

/// Fetch the full review snapshot for a store, oldest first.
///
/// This is the aggregation input: the engine always recomputes from the
/// whole snapshot, never incrementally.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn snapshot_reviews(pool: &PgPool, store_id: Uuid) -> Result<Vec<Review>, DbError> {
    let sql = format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews \
         WHERE store_id = $1 \
         ORDER BY posted_at ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;

    Ok(rows_into_reviews(rows))
}

/// Fetch one review by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such review exists (or it fails
/// domain validation), or [`DbError::Sqlx`] if the query fails.
pub async fn get_review(pool: &PgPool, review_id: Uuid) -> Result<Review, DbError> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1");
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(review_id)
        .fetch_optional(pool)
        .await?;

    row.and_then(ReviewRow::into_domain).ok_or(DbError::NotFound)
}

/// Set a review's moderation status and return the updated record.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such review exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_review_status(
    pool: &PgPool,
    review_id: Uuid,
    status: ReviewStatus,
) -> Result<Review, DbError> {
    let sql = format!(
        "UPDATE reviews SET status = $2, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {REVIEW_COLUMNS}"
    );
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(review_id)
        .bind(status.as_str())
        .fetch_optional(pool)
        .await?;

    row.and_then(ReviewRow::into_domain).ok_or(DbError::NotFound)
}

/// Attach an owner response to a review and return the updated record.
///
/// Sets `responded_at` to the current time; the status is left untouched.
/// Status transitions happen only through explicit status updates.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such review exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_review_response(
    pool: &PgPool,
    review_id: Uuid,
    content: &str,
) -> Result<Review, DbError> {
    let sql = format!(
        "UPDATE reviews SET response_content = $2, responded_at = NOW(), updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {REVIEW_COLUMNS}"
    );
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(review_id)
        .bind(content)
        .fetch_optional(pool)
        .await?;

    row.and_then(ReviewRow::into_domain).ok_or(DbError::NotFound)
}

/// Set the status of many reviews at once (batch moderation).
///
/// Returns the number of rows updated; ids that match nothing are
/// silently skipped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn bulk_update_status(
    pool: &PgPool,
    review_ids: &[Uuid],
    status: ReviewStatus,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE reviews SET status = $2, updated_at = NOW() \
         WHERE id = ANY($1)",
    )
    .bind(review_ids)
    .bind(status.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Insert a review and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_review(pool: &PgPool, review: &NewReview) -> Result<Uuid, DbError> {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO reviews \
             (store_id, platform, rating, content, author, posted_at, status, sentiment, \
              is_urgent, response_content, responded_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id",
    )
    .bind(review.store_id)
    .bind(review.platform.as_str())
    .bind(i16::from(review.rating))
    .bind(&review.content)
    .bind(&review.author)
    .bind(review.posted_at)
    .bind(review.status.as_str())
    .bind(review.sentiment.as_str())
    .bind(review.is_urgent)
    .bind(&review.response_content)
    .bind(review.responded_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
