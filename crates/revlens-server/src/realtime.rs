//! Realtime dashboard snapshot refresher.
//!
//! Subscribes to the review feed and rebuilds the affected store's
//! snapshot in full on every event. Recomputation is never incremental,
//! so a snapshot is always internally consistent with one review set.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use revlens_core::Review;
use revlens_db::{DbError, ReviewFeed};
use revlens_insights::{
    compute_metrics, evaluate_insights, platform_shares, sentiment_breakdown, Insight, MetricSet,
    PlatformShare, SentimentBreakdown, TimeWindow,
};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Derived dashboard state for one store, rebuilt wholesale per event.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub computed_at: DateTime<Utc>,
    pub overall: MetricSet,
    pub recent: MetricSet,
    pub previous: MetricSet,
    pub platforms: Vec<PlatformShare>,
    pub sentiment: SentimentBreakdown,
    pub insights: Vec<Insight>,
}

pub type SnapshotCache = Arc<RwLock<HashMap<Uuid, StoreSnapshot>>>;

#[must_use]
pub fn new_snapshot_cache() -> SnapshotCache {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Build a snapshot from a review collection: whole-collection metrics,
/// last-7-days vs prior-7-days metrics, and the insight list.
#[must_use]
pub fn build_snapshot(reviews: &[Review]) -> StoreSnapshot {
    let now = Utc::now();
    let recent_window = TimeWindow::last_days(now, 7);
    let previous_window = recent_window.preceding();

    let overall = compute_metrics(reviews, None);
    let recent = compute_metrics(reviews, Some(recent_window));
    let previous = compute_metrics(reviews, Some(previous_window));
    let platforms = platform_shares(reviews);
    let insights = evaluate_insights(&recent, &previous, &overall, &platforms);

    StoreSnapshot {
        computed_at: now,
        overall,
        recent,
        previous,
        platforms,
        sentiment: sentiment_breakdown(reviews),
        insights,
    }
}

/// Recompute and cache the snapshot for one store.
///
/// # Errors
///
/// Returns [`DbError`] if the review snapshot cannot be fetched; the
/// previously cached snapshot (if any) is left in place.
pub async fn refresh_snapshot(
    pool: &PgPool,
    cache: &SnapshotCache,
    store_id: Uuid,
) -> Result<StoreSnapshot, DbError> {
    let reviews = revlens_db::snapshot_reviews(pool, store_id).await?;
    let snapshot = build_snapshot(&reviews);
    cache
        .write()
        .await
        .insert(store_id, snapshot.clone());
    Ok(snapshot)
}

/// Spawn the long-lived refresher task: listen for review events and
/// rebuild snapshots for affected stores. Reconnects with a fixed delay
/// when the feed drops. The handle is held by main and dies with the
/// process.
pub fn spawn_refresher(pool: PgPool, cache: SnapshotCache) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let feed = match ReviewFeed::connect(&pool).await {
                Ok(feed) => feed,
                Err(e) => {
                    tracing::warn!(error = %e, "review feed connect failed; retrying");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    continue;
                }
            };

            let mut events = feed.subscribe();
            let pump = tokio::spawn(feed.run());
            tracing::info!("review feed connected; realtime snapshot refresh active");

            loop {
                match events.recv().await {
                    Ok(event) => {
                        match refresh_snapshot(&pool, &cache, event.store_id).await {
                            Ok(snapshot) => tracing::debug!(
                                store_id = %event.store_id,
                                kind = ?event.kind,
                                total = snapshot.overall.total,
                                "snapshot refreshed"
                            ),
                            Err(e) => tracing::warn!(
                                store_id = %event.store_id,
                                error = %e,
                                "snapshot refresh failed; keeping previous snapshot"
                            ),
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "review event consumer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            match pump.await {
                Ok(Err(e)) => tracing::warn!(error = %e, "review feed disconnected; reconnecting"),
                Ok(Ok(())) => {}
                Err(e) => tracing::warn!(error = %e, "review feed task panicked; reconnecting"),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}
