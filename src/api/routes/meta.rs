use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::MetaFormat;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct MetaFormatsResponse {
    pub meta_formats: Vec<MetaFormat>,
}

pub async fn meta_formats(
    State(state): State<AppState>,
) -> Result<Json<MetaFormatsResponse>, ApiError> {
    Ok(Json(MetaFormatsResponse {
        meta_formats: state.source.meta_formats()?,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::{get_json, setup_test_state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_meta_formats() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/meta-formats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["meta_formats"], serde_json::json!(["OP05", "OP06"]));
    }
}
