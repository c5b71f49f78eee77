use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_threshold, resolve_meta_formats, ApiError, NO_DATA_MESSAGE};
use crate::calculate::{group_by_leader, rank_similar_leaders};
use crate::models::{CardId, MetaFormat, SimilarityMode, SimilarityResult};

#[derive(Debug, Default, Deserialize)]
pub struct SimilarLeadersParams {
    pub meta_format: Option<String>,
    pub threshold: Option<f64>,
    pub mode: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarLeadersResponse {
    pub leader_id: CardId,
    pub meta_formats: Vec<MetaFormat>,
    pub mode: SimilarityMode,
    pub threshold: f64,
    pub similar_leaders: Vec<SimilarityResult>,
}

pub async fn similar_leaders(
    State(state): State<AppState>,
    Path(leader_id): Path<String>,
    Query(params): Query<SimilarLeadersParams>,
) -> Result<Json<SimilarLeadersResponse>, ApiError> {
    let meta_formats = resolve_meta_formats(params.meta_format.as_deref(), state.source.as_ref())?;
    let threshold = parse_threshold(
        params.threshold,
        "threshold",
        state.analytics.similarity_threshold,
    )?;
    let mode = match params.mode.as_deref() {
        Some(mode) => mode.parse::<SimilarityMode>().map_err(ApiError::BadRequest)?,
        None => state.analytics.similarity_mode,
    };
    let limit = params
        .limit
        .unwrap_or(state.analytics.similar_leaders_limit)
        .clamp(1, 100);

    let entries = state.source.fetch_tournament_decklists(&meta_formats, None)?;
    let groups = group_by_leader(&entries);
    let target_entries = groups
        .get(&leader_id)
        .ok_or_else(|| ApiError::NoData(NO_DATA_MESSAGE.to_string()))?;

    let mut similar_leaders =
        rank_similar_leaders(target_entries, &leader_id, &groups, threshold, mode)?;
    similar_leaders.truncate(limit);

    Ok(Json(SimilarLeadersResponse {
        leader_id,
        meta_formats,
        mode,
        threshold,
        similar_leaders,
    }))
}
