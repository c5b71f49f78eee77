//! Tournament decklist submissions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CardId, DecklistEntryId, EntityId, MetaFormat};

/// Card id to number of copies, ordered by card id.
pub type Decklist = BTreeMap<CardId, u32>;

/// Reasons a submission is rejected before it reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("card {card_id} has non-positive count {count}")]
    NonPositiveCount { card_id: CardId, count: i64 },

    #[error("decklist contains an empty card id")]
    EmptyCardId,
}

/// One tournament participant's submission.
///
/// Fields are private so that a validated entry cannot be mutated afterwards;
/// use the accessors to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDecklistRecord", into = "RawDecklistRecord")]
pub struct RawDecklistEntry {
    id: DecklistEntryId,
    leader_id: CardId,
    tournament_id: String,
    player_id: String,
    decklist: Decklist,
    placing: Option<u32>,
    meta_format: MetaFormat,
    tournament_timestamp: DateTime<Utc>,
}

/// Wire shape of a submission, as stored in the data lake.
///
/// Counts are signed here so that bad input is reported by validation
/// instead of failing as an opaque parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDecklistRecord {
    pub leader_id: String,
    pub tournament_id: String,
    pub player_id: String,
    pub decklist: BTreeMap<String, i64>,
    #[serde(default)]
    pub placing: Option<u32>,
    pub meta_format: MetaFormat,
    pub tournament_timestamp: DateTime<Utc>,
}

impl RawDecklistEntry {
    /// Validate and build an entry.
    pub fn new(
        leader_id: impl Into<CardId>,
        tournament_id: impl Into<String>,
        player_id: impl Into<String>,
        decklist: Decklist,
        placing: Option<u32>,
        meta_format: MetaFormat,
        tournament_timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        RawDecklistRecord {
            leader_id: leader_id.into(),
            tournament_id: tournament_id.into(),
            player_id: player_id.into(),
            decklist: decklist
                .into_iter()
                .map(|(card_id, count)| (card_id, i64::from(count)))
                .collect(),
            placing,
            meta_format,
            tournament_timestamp,
        }
        .try_into()
    }

    pub fn id(&self) -> &DecklistEntryId {
        &self.id
    }

    pub fn leader_id(&self) -> &str {
        &self.leader_id
    }

    pub fn tournament_id(&self) -> &str {
        &self.tournament_id
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn decklist(&self) -> &Decklist {
        &self.decklist
    }

    pub fn placing(&self) -> Option<u32> {
        self.placing
    }

    pub fn meta_format(&self) -> &MetaFormat {
        &self.meta_format
    }

    pub fn tournament_timestamp(&self) -> DateTime<Utc> {
        self.tournament_timestamp
    }
}

impl TryFrom<RawDecklistRecord> for RawDecklistEntry {
    type Error = ValidationError;

    fn try_from(record: RawDecklistRecord) -> Result<Self, Self::Error> {
        for (field, value) in [
            ("leader_id", &record.leader_id),
            ("tournament_id", &record.tournament_id),
            ("player_id", &record.player_id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField { field });
            }
        }
        if record.meta_format.as_str().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "meta_format",
            });
        }

        let mut decklist = Decklist::new();
        for (card_id, count) in record.decklist {
            if card_id.trim().is_empty() {
                return Err(ValidationError::EmptyCardId);
            }
            let copies = u32::try_from(count)
                .ok()
                .filter(|&c| c > 0)
                .ok_or_else(|| ValidationError::NonPositiveCount {
                    card_id: card_id.clone(),
                    count,
                })?;
            decklist.insert(card_id, copies);
        }

        let id = EntityId::generate(&[&record.tournament_id, &record.player_id]);

        Ok(Self {
            id,
            leader_id: record.leader_id,
            tournament_id: record.tournament_id,
            player_id: record.player_id,
            decklist,
            placing: record.placing,
            meta_format: record.meta_format,
            tournament_timestamp: record.tournament_timestamp,
        })
    }
}

impl From<RawDecklistEntry> for RawDecklistRecord {
    fn from(entry: RawDecklistEntry) -> Self {
        Self {
            leader_id: entry.leader_id,
            tournament_id: entry.tournament_id,
            player_id: entry.player_id,
            decklist: entry
                .decklist
                .into_iter()
                .map(|(card_id, count)| (card_id, i64::from(count)))
                .collect(),
            placing: entry.placing,
            meta_format: entry.meta_format,
            tournament_timestamp: entry.tournament_timestamp,
        }
    }
}
