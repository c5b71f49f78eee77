use std::collections::HashSet;

use crate::models::{Decklist, DecklistAggregate, RawDecklistEntry};

use super::{card_ids_by_occurrence, DECK_SIZE_WITH_LEADER};

/// Pick the submitted decklist that best covers the aggregate's expected
/// card pool.
///
/// The expected pool is built from the most played cards until their average
/// copies fill a deck. Ties keep the earlier entry, so when no entry overlaps
/// the pool at all the first entry is still returned. Empty input yields an
/// empty decklist, which callers treat as "no data".
pub fn best_matching_decklist(
    entries: &[RawDecklistEntry],
    aggregate: &DecklistAggregate,
) -> Decklist {
    let expected_pool = expected_card_pool(aggregate);

    let mut best: Option<(&RawDecklistEntry, usize)> = None;
    for entry in entries {
        let overlap = entry
            .decklist()
            .keys()
            .filter(|card_id| expected_pool.contains(card_id.as_str()))
            .count();
        if best.map_or(true, |(_, best_overlap)| overlap > best_overlap) {
            best = Some((entry, overlap));
        }
    }

    best.map(|(entry, _)| entry.decklist().clone())
        .unwrap_or_default()
}

/// Most played card ids whose average copies add up to a full deck.
pub fn expected_card_pool(aggregate: &DecklistAggregate) -> HashSet<&str> {
    let mut pool = HashSet::new();
    let mut card_count = 0.0;
    for card_id in card_ids_by_occurrence(aggregate) {
        if card_count >= DECK_SIZE_WITH_LEADER as f64 {
            break;
        }
        pool.insert(card_id.as_str());
        card_count += aggregate.avg_count(card_id);
    }
    pool
}
