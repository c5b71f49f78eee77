//! Decklist aggregation and similarity engine.
//!
//! Pure functions over already loaded decklists:
//! - Normalizer: submissions to a [`DecklistAggregate`]
//! - Occurrence ordering and thresholding of card ids
//! - Representative and fictive (synthesized) decklists
//! - Cross-leader similarity scoring
//! - Deck price sums and averages
//!
//! Empty collections where a proportion or mean is needed fail with
//! [`EngineError::EmptyInput`]. A single missing price contributes zero.
//!
//! [`DecklistAggregate`]: crate::models::DecklistAggregate

mod export;
mod fictive;
mod filter;
mod normalize;
mod occurrence;
mod price;
mod representative;
mod similarity;

pub use export::*;
pub use fictive::*;
pub use filter::*;
pub use normalize::*;
pub use occurrence::*;
pub use price::*;
pub use representative::*;
pub use similarity::*;

use thiserror::Error;

/// Cards in a legal deck: 50 plus the leader.
pub const DECK_SIZE_WITH_LEADER: u32 = 51;

/// Maximum copies of a single non-leader card.
pub const MAX_COPIES: u32 = 4;

/// Errors raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no {0} to aggregate")]
    EmptyInput(&'static str),
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use crate::models::{Decklist, MetaFormat, RawDecklistEntry};

    pub fn decklist(cards: &[(&str, u32)]) -> Decklist {
        cards.iter().map(|(c, n)| (c.to_string(), *n)).collect()
    }

    pub fn entry(player: &str, leader: &str, cards: &[(&str, u32)]) -> RawDecklistEntry {
        entry_at(player, leader, cards, "OP05", 2024, 3, 9)
    }

    pub fn entry_at(
        player: &str,
        leader: &str,
        cards: &[(&str, u32)],
        meta_format: &str,
        year: i32,
        month: u32,
        day: u32,
    ) -> RawDecklistEntry {
        RawDecklistEntry::new(
            leader,
            "t-1",
            player,
            decklist(cards),
            None,
            MetaFormat::new(meta_format),
            Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
        )
        .unwrap()
    }

    /// The two-decklist scenario used across the engine tests.
    pub fn l1_entries() -> Vec<RawDecklistEntry> {
        vec![
            entry("p1", "L1", &[("L1", 1), ("A", 2), ("B", 1)]),
            entry("p2", "L1", &[("L1", 1), ("A", 1), ("C", 3)]),
        ]
    }
}
