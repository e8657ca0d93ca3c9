use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use revlens_insights::Insight;

use crate::middleware::RequestId;
use crate::realtime::build_snapshot;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn store_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Insight>>>, ApiError> {
    revlens_db::get_store(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let reviews = revlens_db::snapshot_reviews(&state.pool, store_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = build_snapshot(&reviews).insights;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_app::{app, seed_store};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use sqlx::PgPool;
    use tower::ServiceExt;

    #[sqlx::test(migrations = "../../migrations")]
    async fn store_without_reviews_gets_no_data_insight(pool: PgPool) {
        let store_id = seed_store(&pool, "no-reviews").await;
        let response = app(pool)
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/stores/{store_id}/insights"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        let insights = json["data"].as_array().expect("insights");
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0]["kind"], "info");
    }
}
