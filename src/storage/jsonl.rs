//! JSONL (JSON Lines) storage.
//!
//! Each line is a valid JSON object representing one record.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};

/// Record types kept in the data lake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Decklist,
    CardPrice,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Decklist => "decklists.jsonl",
            EntityType::CardPrice => "card_prices.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for an entity type inside a meta format partition.
    pub fn for_partition(config: &StorageConfig, entity: EntityType, meta_format: &str) -> Self {
        Self::new(partition_path(config, entity, meta_format))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write records, replacing the entire file.
    pub fn write_all(&self, records: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let count = write_lines(BufWriter::new(file), records)?;

        info!("Wrote {} records to {:?}", count, self.path);
        Ok(count)
    }
}

fn write_lines<T: Serialize>(
    mut writer: BufWriter<File>,
    records: &[T],
) -> Result<usize, StorageError> {
    for record in records {
        let json = serde_json::to_string(record)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for an entity type inside a meta format partition.
    pub fn for_partition(config: &StorageConfig, entity: EntityType, meta_format: &str) -> Self {
        Self::new(partition_path(config, entity, meta_format))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all records. A missing file reads as empty; lines that fail to
    /// parse or validate are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping line {} in {:?}: {}", idx + 1, self.path, e);
                }
            }
        }

        debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Read every line strictly: the first bad line fails the whole read.
    pub fn read_all_strict(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| StorageError::InvalidRecord {
                path: self.path.clone(),
                line: idx + 1,
                message: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

/// Path of an entity file inside a meta format partition.
pub fn partition_path(config: &StorageConfig, entity: EntityType, meta_format: &str) -> PathBuf {
    config
        .normalized_dir()
        .join(meta_format)
        .join(entity.filename())
}

/// Meta format partitions present on disk, sorted.
pub fn list_partitions(config: &StorageConfig) -> Result<Vec<String>, StorageError> {
    let dir = config.normalized_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut partitions = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                partitions.push(name.to_string());
            }
        }
    }

    partitions.sort();
    Ok(partitions)
}
