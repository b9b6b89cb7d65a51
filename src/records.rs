//! Persistent high-score table
//!
//! A short ranked list of `(name, value)` pairs stored as JSON. A missing or
//! unreadable-as-JSON file is treated as an empty table.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub value: u32,
}

impl Record {
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("records capacity cannot be negative, got {0}")]
    NegativeCapacity(i64),
    #[error("records file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("records serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Records sorted by value, highest first, at most `capacity` long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTable {
    capacity: usize,
    records: Vec<Record>,
}

impl RecordTable {
    pub fn new(capacity: i64) -> Result<Self, RecordsError> {
        let capacity = usize::try_from(capacity).map_err(|_| RecordsError::NegativeCapacity(capacity))?;
        Ok(Self {
            capacity,
            records: Vec::with_capacity(capacity),
        })
    }

    /// Read the table from `path`, keeping only the best `capacity` entries
    pub fn load(path: impl AsRef<Path>, capacity: i64) -> Result<Self, RecordsError> {
        let mut table = Self::new(capacity)?;
        let path = path.as_ref();

        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No records file at {}, starting empty", path.display());
                return Ok(table);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Vec<Record>>(&json) {
            Ok(records) => {
                table.records = records;
                table.normalize();
            }
            Err(e) => warn!("Ignoring malformed records file {}: {}", path.display(), e),
        }
        Ok(table)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordsError> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `value` would make it into the table
    pub fn qualifies(&self, value: u32) -> bool {
        if self.capacity == 0 {
            return false;
        }
        match self.records.last() {
            Some(lowest) if self.records.len() >= self.capacity => lowest.value < value,
            _ => true,
        }
    }

    /// Insert the record if it qualifies. Returns whether it was kept.
    pub fn submit(&mut self, name: impl Into<String>, value: u32) -> bool {
        if !self.qualifies(value) {
            return false;
        }
        self.records.push(Record::new(name, value));
        self.normalize();
        true
    }

    /// Stable sort keeps the older of two equal values ahead
    fn normalize(&mut self) {
        self.records.sort_by(|a, b| b.value.cmp(&a.value));
        self.records.truncate(self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("records-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_negative_capacity_is_rejected() {
        let err = RecordTable::new(-1).unwrap_err();
        assert!(matches!(err, RecordsError::NegativeCapacity(-1)));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_qualifies_until_full() {
        let mut table = RecordTable::new(2).unwrap();
        assert!(table.qualifies(1));
        assert!(table.submit("a", 10));
        assert!(table.submit("b", 5));

        assert!(!table.qualifies(5));
        assert!(table.qualifies(6));
        assert!(table.submit("c", 7));
        assert_eq!(
            table.records(),
            &[Record::new("a", 10), Record::new("c", 7)]
        );
    }

    #[test]
    fn test_zero_capacity_never_qualifies() {
        let mut table = RecordTable::new(0).unwrap();
        assert!(!table.qualifies(u32::MAX));
        assert!(!table.submit("a", 1));
        assert!(table.is_empty());
    }

    #[test]
    fn test_equal_values_keep_insertion_order() {
        let mut table = RecordTable::new(5).unwrap();
        table.submit("first", 40);
        table.submit("second", 40);
        assert_eq!(table.records()[0].name, "first");
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path();
        let mut table = RecordTable::new(5).unwrap();
        table.submit("Test", 120);
        table.submit("Computer1", 300);
        table.save(&path).unwrap();

        let loaded = RecordTable::load(&path, 5).unwrap();
        assert_eq!(loaded, table);

        // Smaller capacity keeps the best entries only
        let loaded = RecordTable::load(&path, 1).unwrap();
        assert_eq!(loaded.records(), &[Record::new("Computer1", 300)]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let table = RecordTable::load(temp_path(), 5).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let path = temp_path();
        fs::write(&path, "{ not json").unwrap();
        let table = RecordTable::load(&path, 5).unwrap();
        assert!(table.is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unsorted_file_is_normalized() {
        let path = temp_path();
        fs::write(&path, r#"[{"name":"a","value":1},{"name":"b","value":9}]"#).unwrap();
        let table = RecordTable::load(&path, 5).unwrap();
        assert_eq!(table.records()[0], Record::new("b", 9));
        fs::remove_file(&path).unwrap();
    }
}
