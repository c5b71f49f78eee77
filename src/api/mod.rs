//! REST API endpoints.
//!
//! Axum-based JSON API that feeds the dashboards with decklist aggregates,
//! similar leaders and deck prices.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::calculate::EngineError;
use crate::models::MetaFormat;
use crate::storage::{DecklistSource, StorageError};

use state::AppState;

/// Message shown when a selection has no decklists behind it.
pub const NO_DATA_MESSAGE: &str = "No data available for this selection";

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NoData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        tracing::debug!("Engine returned {}", err);
        ApiError::NoData(NO_DATA_MESSAGE.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Storage failure: {}", err);
        ApiError::Internal(err.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NoData(_) => (StatusCode::NOT_FOUND, "NO_DATA"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::meta::health))
        .route("/api/meta-formats", get(routes::meta::meta_formats))
        .route(
            "/api/leaders/:leader_id/decklists",
            get(routes::decklists::leader_decklists),
        )
        .route(
            "/api/leaders/:leader_id/similar",
            get(routes::similar::similar_leaders),
        )
        .route("/api/prices/decklist", post(routes::prices::decklist_price))
        .route("/api/prices/average", post(routes::prices::average_price))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for the configured origin; `*` allows any origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Meta formats from a comma-separated query value, or every stored one.
pub fn resolve_meta_formats(
    param: Option<&str>,
    source: &dyn DecklistSource,
) -> Result<Vec<MetaFormat>, ApiError> {
    let formats = match param {
        Some(value) if !value.trim().is_empty() => MetaFormat::parse_list(value),
        _ => source.meta_formats()?,
    };
    if formats.is_empty() {
        return Err(ApiError::NoData(NO_DATA_MESSAGE.to_string()));
    }
    Ok(formats)
}

/// Parse an optional `YYYY-MM-DD` query value.
pub fn parse_date(param: Option<&str>, name: &str) -> Result<Option<NaiveDate>, ApiError> {
    param
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
                ApiError::BadRequest(format!("{} must be a YYYY-MM-DD date, got {:?}", name, s))
            })
        })
        .transpose()
}

/// Check an optional proportion parameter, falling back to `default`.
pub fn parse_threshold(param: Option<f64>, name: &str, default: f64) -> Result<f64, ApiError> {
    let value = param.unwrap_or(default);
    if !(0.0..=1.0).contains(&value) {
        return Err(ApiError::BadRequest(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::config::AnalyticsConfig;
    use crate::models::{CardPrice, Decklist, MetaFormat, RawDecklistEntry};
    use crate::storage::{import_decklists, write_card_prices, JsonlDecklistSource, StorageConfig};

    use super::state::AppState;

    pub fn entry(player: &str, leader: &str, cards: &[(&str, u32)], meta_format: &str) -> RawDecklistEntry {
        let decklist: Decklist = cards.iter().map(|(c, n)| (c.to_string(), *n)).collect();
        RawDecklistEntry::new(
            leader,
            "t-1",
            player,
            decklist,
            Some(1),
            MetaFormat::new(meta_format),
            Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap(),
        )
        .unwrap()
    }

    /// Data lake with two L1 lists, one L2 list and prices for A and B.
    pub fn setup_test_state(dir: &std::path::Path) -> AppState {
        let storage = StorageConfig::new(dir.to_path_buf());
        import_decklists(
            &storage,
            vec![
                entry("p1", "L1", &[("L1", 1), ("A", 2), ("B", 1)], "OP05"),
                entry("p2", "L1", &[("L1", 1), ("A", 1), ("C", 3)], "OP05"),
                entry("q1", "L2", &[("L2", 1), ("A", 4), ("D", 4)], "OP06"),
            ],
        )
        .unwrap();
        write_card_prices(
            &storage,
            &[
                CardPrice::new("A").with_eur(1.5).with_usd(2.0),
                CardPrice::new("B").with_eur(3.0),
            ],
        )
        .unwrap();

        AppState::new(JsonlDecklistSource::new(storage), AnalyticsConfig::default())
    }

    pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}
