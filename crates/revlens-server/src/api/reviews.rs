use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use revlens_core::{Platform, Review, ReviewStatus};
use revlens_db::ReviewFilter;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ListReviewsQuery {
    pub status: Option<String>,
    pub platform: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusBody {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponseBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct BulkStatusBody {
    pub review_ids: Vec<Uuid>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(super) struct BulkStatusData {
    pub updated: u64,
}

fn parse_status(req_id: &str, raw: &str) -> Result<ReviewStatus, ApiError> {
    ReviewStatus::parse(raw).ok_or_else(|| {
        ApiError::new(
            req_id.to_string(),
            "validation_error",
            format!("unknown status '{raw}'; expected pending, approved, published, or rejected"),
        )
    })
}

pub(super) async fn list_store_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<ApiResponse<Vec<Review>>>, ApiError> {
    revlens_db::get_store(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let status = match &query.status {
        Some(raw) => Some(parse_status(&req_id.0, raw)?),
        None => None,
    };
    let platform = match &query.platform {
        Some(raw) => Some(Platform::parse(raw).ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                format!("unknown platform '{raw}'"),
            )
        })?),
        None => None,
    };

    let data = revlens_db::list_reviews(
        &state.pool,
        store_id,
        ReviewFilter { status, platform },
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn update_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(review_id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    let status = parse_status(&req_id.0, &body.status)?;

    let data = revlens_db::update_review_status(&state.pool, review_id, status)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn set_response(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(review_id): Path<Uuid>,
    Json(body): Json<ResponseBody>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "response content must be non-empty",
        ));
    }

    let data = revlens_db::set_review_response(&state.pool, review_id, &body.content)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn bulk_update_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<BulkStatusBody>,
) -> Result<Json<ApiResponse<BulkStatusData>>, ApiError> {
    if body.review_ids.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "review_ids must be non-empty",
        ));
    }
    let status = parse_status(&req_id.0, &body.status)?;

    let updated = revlens_db::bulk_update_status(&state.pool, &body.review_ids, status)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: BulkStatusData { updated },
        meta: ResponseMeta::new(req_id.0),
    }))
}
