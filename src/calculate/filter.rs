use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Currency, PriceLookup, RawDecklistEntry};

use super::decklist_price;

/// Inclusive deck price bounds in one currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub currency: Currency,
    pub min: f64,
    pub max: f64,
}

/// Optional restrictions on which submissions enter an aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecklistFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Keep only placings `<= max_placing`; unknown placings are dropped
    pub max_placing: Option<u32>,

    pub price_range: Option<PriceRange>,
}

impl DecklistFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, entry: &RawDecklistEntry, price_lookup: &PriceLookup) -> bool {
        let date = entry.tournament_timestamp().date_naive();
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }

        if let Some(max_placing) = self.max_placing {
            match entry.placing() {
                Some(placing) if placing <= max_placing => {}
                _ => return false,
            }
        }

        if let Some(range) = self.price_range {
            let price = decklist_price(entry.decklist(), price_lookup, range.currency);
            if price < range.min || price > range.max {
                return false;
            }
        }

        true
    }
}

/// Entries passing `filter`, in input order.
pub fn filter_decklists(
    entries: &[RawDecklistEntry],
    filter: &DecklistFilter,
    price_lookup: &PriceLookup,
) -> Vec<RawDecklistEntry> {
    entries
        .iter()
        .filter(|entry| filter.matches(entry, price_lookup))
        .cloned()
        .collect()
}
