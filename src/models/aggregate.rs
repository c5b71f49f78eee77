//! Derived decklist statistics.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CardId, MetaFormat};

/// Summary of a collection of decklists sharing a filter (same leader,
/// same meta formats, ...).
///
/// All four per-card maps share the same key set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecklistAggregate {
    /// Number of contributing decklists, always > 0
    pub num_decklists: usize,

    /// Number of decklists containing the card at least once
    pub card_id_to_occurrences: BTreeMap<CardId, u32>,

    /// `occurrences / num_decklists`
    pub card_id_to_occurrence_proportion: BTreeMap<CardId, f64>,

    /// Copies summed over all decklists
    pub card_id_to_total_count: BTreeMap<CardId, u32>,

    /// Copies per decklist that plays the card, rounded to 2 decimals
    pub card_id_to_avg_count: BTreeMap<CardId, f64>,

    pub avg_price_eur: Option<f64>,
    pub avg_price_usd: Option<f64>,

    /// Distinct meta formats of the contributing decklists
    pub meta_formats: Vec<MetaFormat>,

    pub min_tournament_date: NaiveDate,
    pub max_tournament_date: NaiveDate,
}

impl DecklistAggregate {
    pub fn occurrences(&self, card_id: &str) -> u32 {
        self.card_id_to_occurrences
            .get(card_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn occurrence_proportion(&self, card_id: &str) -> f64 {
        self.card_id_to_occurrence_proportion
            .get(card_id)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn avg_count(&self, card_id: &str) -> f64 {
        self.card_id_to_avg_count
            .get(card_id)
            .copied()
            .unwrap_or(0.0)
    }
}

/// How two card pools are scored against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    /// Shared cards / comparison pool size. Used by the similar-leaders
    /// overview where every staple counts the same.
    #[default]
    CardCount,

    /// Shared occurrence mass / comparison pool occurrence mass. Used by the
    /// leader detail view, where rarely played techs should weigh less.
    OccurrenceWeighted,
}

impl SimilarityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMode::CardCount => "card_count",
            SimilarityMode::OccurrenceWeighted => "occurrence_weighted",
        }
    }
}

impl fmt::Display for SimilarityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "card_count" | "count" => Ok(SimilarityMode::CardCount),
            "occurrence_weighted" | "weighted" => Ok(SimilarityMode::OccurrenceWeighted),
            other => Err(format!("unknown similarity mode: {}", other)),
        }
    }
}

/// Result of comparing a target card pool against a comparison pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Leader of the comparison aggregate
    pub leader_id: CardId,

    pub mode: SimilarityMode,

    /// In `[0, 1]`
    pub similarity_score: f64,

    /// Shared cards, by comparison occurrence descending
    pub cards_intersection: Vec<CardId>,

    /// Comparison cards the target does not play, by comparison occurrence
    /// descending. Never contains either leader.
    pub cards_missing: Vec<CardId>,

    /// From the comparison aggregate, restricted to intersection and missing cards
    pub card_id_to_avg_count: BTreeMap<CardId, f64>,
}
