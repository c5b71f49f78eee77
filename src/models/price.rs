//! Card price model.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CardId;

/// Currency a price is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Eur,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "eur",
            Currency::Usd => "usd",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eur" | "euro" | "€" => Ok(Currency::Eur),
            "usd" | "us_dollar" | "$" => Ok(Currency::Usd),
            other => Err(format!("unknown currency: {}", other)),
        }
    }
}

/// Latest known market price of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPrice {
    pub card_id: CardId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    /// Latest Cardmarket price in euro
    #[serde(default)]
    pub eur: Option<f64>,

    /// Latest TCGplayer price in US dollar
    #[serde(default)]
    pub usd: Option<f64>,
}

impl CardPrice {
    pub fn new(card_id: impl Into<CardId>) -> Self {
        Self {
            card_id: card_id.into(),
            name: None,
            image_url: None,
            eur: None,
            usd: None,
        }
    }

    pub fn with_eur(mut self, price: f64) -> Self {
        self.eur = Some(price);
        self
    }

    pub fn with_usd(mut self, price: f64) -> Self {
        self.usd = Some(price);
        self
    }

    /// Price in the requested currency, if tracked.
    pub fn price(&self, currency: Currency) -> Option<f64> {
        match currency {
            Currency::Eur => self.eur,
            Currency::Usd => self.usd,
        }
    }
}

/// Card id to latest price.
pub type PriceLookup = HashMap<CardId, CardPrice>;

/// Build a lookup from a list of prices; later entries win.
pub fn price_lookup(prices: impl IntoIterator<Item = CardPrice>) -> PriceLookup {
    prices
        .into_iter()
        .map(|p| (p.card_id.clone(), p))
        .collect()
}
