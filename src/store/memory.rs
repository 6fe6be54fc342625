use std::collections::BTreeMap;

use super::{RecordKey, RecordStore};
use crate::error::Result;

/// In-memory record store, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<String, String>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a body under any key, bypassing encoding.
    pub fn insert_raw(&mut self, key: &str, body: &str) {
        self.records.insert(key.to_string(), body.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn list_boxes(&self) -> Result<Vec<RecordKey>> {
        let mut keys: Vec<RecordKey> = self
            .records
            .keys()
            .filter_map(|k| RecordKey::parse(k))
            .filter(|k| k.box_id().is_some())
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn read(&self, key: &RecordKey) -> Result<Option<String>> {
        Ok(self.records.get(&key.to_string()).cloned())
    }

    fn write(&mut self, key: &RecordKey, body: &str) -> Result<()> {
        self.records.insert(key.to_string(), body.to_string());
        Ok(())
    }
}
