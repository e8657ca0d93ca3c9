use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use revlens_core::Review;
use revlens_insights::{
    compute_metrics, day_of_week_histogram, hour_day_heatmap, platform_shares,
    response_time_histogram, sentiment_breakdown, trend, DayOfWeekBucket, HeatmapCell, MetricSet,
    PlatformShare, ResponseTimeBucket, SentimentBreakdown, TimeWindow, Trend,
};

use crate::middleware::RequestId;
use crate::realtime::{refresh_snapshot, StoreSnapshot};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct MetricsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct MetricsData {
    pub window_days: i64,
    pub current: MetricSet,
    pub previous: MetricSet,
    pub rating_trend: Trend,
    pub volume_trend: Trend,
    pub response_rate_trend: Trend,
    pub platforms: Vec<PlatformShare>,
    pub sentiment: SentimentBreakdown,
}

/// Fetch the review snapshot for a store, mapping an unknown store to 404.
async fn store_snapshot(
    state: &AppState,
    req_id: &str,
    store_id: Uuid,
) -> Result<Vec<Review>, ApiError> {
    revlens_db::get_store(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;
    revlens_db::snapshot_reviews(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))
}

pub(super) async fn store_metrics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<ApiResponse<MetricsData>>, ApiError> {
    let window_days = query.days.unwrap_or(7).clamp(1, 90);
    let reviews = store_snapshot(&state, &req_id.0, store_id).await?;

    let current_window = TimeWindow::last_days(chrono::Utc::now(), window_days);
    let previous_window = current_window.preceding();

    let current = compute_metrics(&reviews, Some(current_window));
    let previous = compute_metrics(&reviews, Some(previous_window));

    #[allow(clippy::cast_precision_loss)]
    let volume_trend = trend(current.total as f64, previous.total as f64);

    let data = MetricsData {
        window_days,
        rating_trend: trend(current.average_rating, previous.average_rating),
        volume_trend,
        response_rate_trend: trend(current.response_rate, previous.response_rate),
        platforms: platform_shares(&reviews),
        sentiment: sentiment_breakdown(&reviews),
        current,
        previous,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn day_of_week(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<DayOfWeekBucket>>>, ApiError> {
    let reviews = store_snapshot(&state, &req_id.0, store_id).await?;
    let data = day_of_week_histogram(&reviews).to_vec();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn response_times(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ResponseTimeBucket>>>, ApiError> {
    let reviews = store_snapshot(&state, &req_id.0, store_id).await?;
    let hours: Vec<f64> = reviews.iter().filter_map(Review::response_hours).collect();
    let data = response_time_histogram(&hours).to_vec();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn heatmap(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<HeatmapCell>>>, ApiError> {
    let reviews = store_snapshot(&state, &req_id.0, store_id).await?;
    let data = hour_day_heatmap(&reviews);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Serve the cached dashboard snapshot, computing it on a cache miss.
/// The realtime refresher keeps the cache current as events arrive.
pub(super) async fn dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<ApiResponse<StoreSnapshot>>, ApiError> {
    revlens_db::get_store(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let cached = state.snapshots.read().await.get(&store_id).cloned();
    let data = match cached {
        Some(snapshot) => snapshot,
        None => refresh_snapshot(&state.pool, &state.snapshots, store_id)
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
