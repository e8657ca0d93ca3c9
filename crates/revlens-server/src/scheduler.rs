//! Background job scheduler.
//!
//! Runs a daily digest job that logs headline metrics for every store.

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use revlens_insights::{compute_metrics, round1, TimeWindow};

/// Builds and starts the background job scheduler with the daily digest
/// job registered on the given cron schedule.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all scheduled
/// jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised
/// or started, or the schedule expression is invalid.
pub async fn build_scheduler(
    pool: PgPool,
    schedule: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let digest = Job::new_async(schedule, move |_id, _sched| {
        let pool = pool.clone();
        Box::pin(async move {
            if let Err(e) = log_daily_digest(&pool).await {
                tracing::warn!(error = %e, "daily digest job failed");
            }
        })
    })?;

    scheduler.add(digest).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn log_daily_digest(pool: &PgPool) -> Result<(), revlens_db::DbError> {
    let window = TimeWindow::last_days(chrono::Utc::now(), 7);

    for store in revlens_db::list_stores(pool).await? {
        let reviews = revlens_db::snapshot_reviews(pool, store.id).await?;
        let overall = compute_metrics(&reviews, None);
        let recent = compute_metrics(&reviews, Some(window));

        tracing::info!(
            store = %store.slug,
            total = overall.total,
            average_rating = round1(overall.average_rating),
            response_rate = round1(overall.response_rate),
            last_7_days = recent.total,
            pending = overall.pending,
            "daily review digest"
        );
    }

    Ok(())
}
