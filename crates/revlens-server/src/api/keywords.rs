use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use revlens_insights::{extract_keywords, negative_keywords, positive_keywords, KeywordStat};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct KeywordsQuery {
    pub view: Option<String>,
}

pub(super) async fn store_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
    Query(query): Query<KeywordsQuery>,
) -> Result<Json<ApiResponse<Vec<KeywordStat>>>, ApiError> {
    revlens_db::get_store(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let reviews = revlens_db::snapshot_reviews(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let stats = extract_keywords(&reviews);
    let data = match query.view.as_deref() {
        None | Some("all") => stats,
        Some("positive") => positive_keywords(&stats),
        Some("negative") => negative_keywords(&stats),
        Some(other) => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                format!("unknown view '{other}'; expected all, positive, or negative"),
            ))
        }
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
