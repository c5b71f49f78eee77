use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_date, parse_threshold, resolve_meta_formats, ApiError};
use crate::calculate::{
    best_matching_decklist, export_decklist, filter_decklists, normalize_with_prices,
    select_card_ids, synthesize_decklist, DecklistFilter,
};
use crate::models::{CardId, Decklist, DecklistAggregate, MetaFormat};

#[derive(Debug, Default, Deserialize)]
pub struct LeaderDecklistParams {
    /// Comma-separated meta formats; all stored formats when absent
    pub meta_format: Option<String>,
    pub occurrence_threshold: Option<f64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub max_placing: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LeaderDecklistsResponse {
    pub leader_id: CardId,
    pub meta_formats: Vec<MetaFormat>,
    pub occurrence_threshold: f64,
    pub aggregate: DecklistAggregate,
    /// Cards at or above the threshold, by occurrence
    pub card_ids: Vec<CardId>,
    pub representative_decklist: Decklist,
    pub representative_export: String,
    pub fictive_decklist: Decklist,
    pub fictive_export: String,
}

pub async fn leader_decklists(
    State(state): State<AppState>,
    Path(leader_id): Path<String>,
    Query(params): Query<LeaderDecklistParams>,
) -> Result<Json<LeaderDecklistsResponse>, ApiError> {
    let meta_formats = resolve_meta_formats(params.meta_format.as_deref(), state.source.as_ref())?;
    let occurrence_threshold = parse_threshold(
        params.occurrence_threshold,
        "occurrence_threshold",
        state.analytics.occurrence_threshold,
    )?;
    let filter = DecklistFilter {
        start_date: parse_date(params.from.as_deref(), "from")?,
        end_date: parse_date(params.to.as_deref(), "to")?,
        max_placing: params.max_placing,
        price_range: None,
    };

    let entries = state
        .source
        .fetch_tournament_decklists(&meta_formats, Some(std::slice::from_ref(&leader_id)))?;
    let price_lookup = state.source.fetch_card_price_lookup()?;
    let entries = if filter.is_empty() {
        entries
    } else {
        filter_decklists(&entries, &filter, &price_lookup)
    };

    let aggregate = normalize_with_prices(&entries, &price_lookup)?;
    let card_ids = select_card_ids(&aggregate, occurrence_threshold, &[leader_id.as_str()]);
    let representative_decklist = best_matching_decklist(&entries, &aggregate);
    let fictive_decklist = synthesize_decklist(&aggregate, &leader_id);

    tracing::debug!(
        "Aggregated {} decklists for {} over {:?}",
        aggregate.num_decklists,
        leader_id,
        meta_formats
    );

    Ok(Json(LeaderDecklistsResponse {
        representative_export: export_decklist(&representative_decklist, &leader_id),
        fictive_export: export_decklist(&fictive_decklist, &leader_id),
        leader_id,
        meta_formats,
        occurrence_threshold,
        aggregate,
        card_ids,
        representative_decklist,
        fictive_decklist,
    }))
}
