use std::collections::BTreeMap;

use crate::models::{CardId, Currency, DecklistAggregate, MetaFormat, PriceLookup, RawDecklistEntry};

use super::{average_price, round2, EngineError};

/// Aggregate a collection of submissions into per-card statistics.
///
/// Each card counts once per decklist towards its occurrences, regardless of
/// copies. Average copies are conditioned on presence: `total / occurrences`.
pub fn normalize(entries: &[RawDecklistEntry]) -> Result<DecklistAggregate, EngineError> {
    let (first, rest) = entries
        .split_first()
        .ok_or(EngineError::EmptyInput("decklists"))?;

    let mut occurrences: BTreeMap<CardId, u32> = BTreeMap::new();
    let mut total_counts: BTreeMap<CardId, u32> = BTreeMap::new();
    let mut meta_formats: Vec<MetaFormat> = Vec::new();
    let mut min_date = first.tournament_timestamp().date_naive();
    let mut max_date = min_date;

    for entry in std::iter::once(first).chain(rest) {
        for (card_id, &count) in entry.decklist() {
            *occurrences.entry(card_id.clone()).or_default() += 1;
            *total_counts.entry(card_id.clone()).or_default() += count;
        }

        if !meta_formats.contains(entry.meta_format()) {
            meta_formats.push(entry.meta_format().clone());
        }
        let date = entry.tournament_timestamp().date_naive();
        min_date = min_date.min(date);
        max_date = max_date.max(date);
    }
    meta_formats.sort();

    let num_decklists = entries.len();
    let card_id_to_occurrence_proportion = occurrences
        .iter()
        .map(|(card_id, &occ)| (card_id.clone(), occ as f64 / num_decklists as f64))
        .collect();
    let card_id_to_avg_count = total_counts
        .iter()
        .map(|(card_id, &total)| {
            let occ = occurrences.get(card_id).copied().unwrap_or(1);
            (card_id.clone(), round2(total as f64 / occ as f64))
        })
        .collect();

    Ok(DecklistAggregate {
        num_decklists,
        card_id_to_occurrences: occurrences,
        card_id_to_occurrence_proportion,
        card_id_to_total_count: total_counts,
        card_id_to_avg_count,
        avg_price_eur: None,
        avg_price_usd: None,
        meta_formats,
        min_tournament_date: min_date,
        max_tournament_date: max_date,
    })
}

/// [`normalize`], additionally filling the average deck price in both
/// currencies from `price_lookup`.
pub fn normalize_with_prices(
    entries: &[RawDecklistEntry],
    price_lookup: &PriceLookup,
) -> Result<DecklistAggregate, EngineError> {
    let mut aggregate = normalize(entries)?;
    let decklists = entries.iter().map(RawDecklistEntry::decklist);
    aggregate.avg_price_eur = Some(average_price(decklists.clone(), price_lookup, Currency::Eur)?);
    aggregate.avg_price_usd = Some(average_price(decklists, price_lookup, Currency::Usd)?);
    Ok(aggregate)
}
