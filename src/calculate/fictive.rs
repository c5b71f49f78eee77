use crate::models::{Decklist, DecklistAggregate};

use super::{select_card_ids, DECK_SIZE_WITH_LEADER, MAX_COPIES};

/// Build a synthetic decklist straight from aggregate statistics.
///
/// Starts from the leader and adds the most played cards at their rounded
/// average copies (capped at [`MAX_COPIES`]) until the deck is full.
pub fn synthesize_decklist(aggregate: &DecklistAggregate, leader_id: &str) -> Decklist {
    let mut decklist = Decklist::from([(leader_id.to_string(), 1)]);
    let mut total = 1;

    for card_id in select_card_ids(aggregate, 0.0, &[leader_id]) {
        if total >= DECK_SIZE_WITH_LEADER {
            break;
        }
        let avg = aggregate.avg_count(&card_id).round_ties_even().max(0.0) as u32;
        let to_add = avg.min(MAX_COPIES).min(DECK_SIZE_WITH_LEADER - total);
        if to_add > 0 {
            decklist.insert(card_id, to_add);
            total += to_add;
        }
    }

    decklist
}
