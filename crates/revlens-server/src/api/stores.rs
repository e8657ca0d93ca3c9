use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct StoreItem {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub timezone: Option<String>,
    pub platforms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StoreItem>>>, ApiError> {
    let rows = revlens_db::list_stores(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| StoreItem {
            id: row.id,
            slug: row.slug,
            name: row.name,
            timezone: row.timezone,
            platforms: row.platforms,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
