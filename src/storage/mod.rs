//! Filesystem data lake.
//!
//! Stands in for the warehouse: validated decklists partitioned by meta
//! format under `normalized/<meta_format>/decklists.jsonl`, and the latest
//! card prices in `normalized/card_prices.jsonl`.

mod jsonl;

pub use jsonl::*;

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{price_lookup, CardId, CardPrice, MetaFormat, PriceLookup, RawDecklistEntry};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid record at {path:?} line {line}: {message}")]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn normalized_dir(&self) -> PathBuf {
        self.data_dir.join("normalized")
    }

    pub fn card_prices_path(&self) -> PathBuf {
        self.normalized_dir().join(EntityType::CardPrice.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Where tournament decklists and card prices come from.
pub trait DecklistSource: Send + Sync {
    /// Decklists of the given meta formats, optionally restricted to leaders.
    fn fetch_tournament_decklists(
        &self,
        meta_formats: &[MetaFormat],
        leader_ids: Option<&[CardId]>,
    ) -> Result<Vec<RawDecklistEntry>, StorageError>;

    /// Latest price per card.
    fn fetch_card_price_lookup(&self) -> Result<PriceLookup, StorageError>;

    /// Meta formats with stored decklists.
    fn meta_formats(&self) -> Result<Vec<MetaFormat>, StorageError>;
}

/// [`DecklistSource`] backed by the JSONL data lake.
#[derive(Debug, Clone, Default)]
pub struct JsonlDecklistSource {
    config: StorageConfig,
}

impl JsonlDecklistSource {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl DecklistSource for JsonlDecklistSource {
    fn fetch_tournament_decklists(
        &self,
        meta_formats: &[MetaFormat],
        leader_ids: Option<&[CardId]>,
    ) -> Result<Vec<RawDecklistEntry>, StorageError> {
        let mut entries = Vec::new();
        for meta_format in meta_formats {
            let reader = JsonlReader::<RawDecklistEntry>::for_partition(
                &self.config,
                EntityType::Decklist,
                meta_format.as_str(),
            );
            entries.extend(reader.read_all()?.into_iter().filter(|entry| {
                leader_ids.map_or(true, |ids| ids.iter().any(|id| id == entry.leader_id()))
            }));
        }

        let entries = dedup_by_id(entries);
        debug!(
            "Fetched {} decklists for {:?} (leaders: {:?})",
            entries.len(),
            meta_formats,
            leader_ids
        );
        Ok(entries)
    }

    fn fetch_card_price_lookup(&self) -> Result<PriceLookup, StorageError> {
        let reader = JsonlReader::<CardPrice>::new(self.config.card_prices_path());
        Ok(price_lookup(reader.read_all()?))
    }

    fn meta_formats(&self) -> Result<Vec<MetaFormat>, StorageError> {
        Ok(list_partitions(&self.config)?
            .iter()
            .map(|name| MetaFormat::new(name.as_str()))
            .collect())
    }
}

/// Deduplicate entries by id, keeping the first occurrence.
pub fn dedup_by_id(entries: Vec<RawDecklistEntry>) -> Vec<RawDecklistEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id().clone()))
        .collect()
}

/// Merge `entries` into the data lake, one partition per meta format.
///
/// Entries already stored (same tournament and player) are replaced.
/// Returns the number of entries written per meta format.
pub fn import_decklists(
    config: &StorageConfig,
    entries: Vec<RawDecklistEntry>,
) -> Result<BTreeMap<MetaFormat, usize>, StorageError> {
    let mut by_format: BTreeMap<MetaFormat, Vec<RawDecklistEntry>> = BTreeMap::new();
    for entry in dedup_by_id(entries) {
        by_format
            .entry(entry.meta_format().clone())
            .or_default()
            .push(entry);
    }

    let mut written = BTreeMap::new();
    for (meta_format, new_entries) in by_format {
        let reader = JsonlReader::<RawDecklistEntry>::for_partition(
            config,
            EntityType::Decklist,
            meta_format.as_str(),
        );
        let imported = new_entries.len();
        let merged = dedup_by_id(new_entries.into_iter().chain(reader.read_all()?).collect());

        let writer =
            JsonlWriter::for_partition(config, EntityType::Decklist, meta_format.as_str());
        writer.write_all(&merged)?;
        info!(
            "Imported {} decklists into {} ({} stored)",
            imported,
            meta_format,
            merged.len()
        );
        written.insert(meta_format, imported);
    }
    Ok(written)
}

/// Replace the stored card prices.
pub fn write_card_prices(config: &StorageConfig, prices: &[CardPrice]) -> Result<usize, StorageError> {
    JsonlWriter::new(config.card_prices_path()).write_all(prices)
}
