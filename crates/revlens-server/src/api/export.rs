use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use uuid::Uuid;

use revlens_core::export::{csv_document, json_document};
use revlens_core::Review;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

const CSV_HEADER: [&str; 11] = [
    "id",
    "platform",
    "rating",
    "author",
    "posted_at",
    "status",
    "sentiment",
    "is_urgent",
    "content",
    "response_content",
    "responded_at",
];

async fn export_reviews(
    state: &AppState,
    req_id: &str,
    store_id: Uuid,
) -> Result<(String, Vec<Review>), ApiError> {
    let store = revlens_db::get_store(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;
    let reviews = revlens_db::snapshot_reviews(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;
    Ok((store.slug, reviews))
}

fn attachment(content_type: &'static str, filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

pub(super) async fn reviews_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (slug, reviews) = export_reviews(&state, &req_id.0, store_id).await?;

    let rows: Vec<Vec<String>> = reviews
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.platform.to_string(),
                r.rating.to_string(),
                r.author.clone().unwrap_or_default(),
                r.posted_at.to_rfc3339(),
                r.status.to_string(),
                r.sentiment.to_string(),
                r.is_urgent.to_string(),
                r.content.clone(),
                r.response_content.clone().unwrap_or_default(),
                r.responded_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ]
        })
        .collect();

    let body = csv_document(&CSV_HEADER, &rows);
    Ok(attachment("text/csv", &format!("reviews-{slug}.csv"), body))
}

pub(super) async fn reviews_json(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (slug, reviews) = export_reviews(&state, &req_id.0, store_id).await?;

    let body = json_document(&reviews).map_err(|e| {
        tracing::error!(error = %e, "review export serialization failed");
        ApiError::new(req_id.0.clone(), "internal_error", "export failed")
    })?;

    Ok(attachment(
        "application/json",
        &format!("reviews-{slug}.json"),
        body,
    ))
}
