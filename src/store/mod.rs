//! Record persistence.
//!
//! Every box is its own record and the reject set is one more record. There
//! is no transaction spanning records: each write replaces a whole record.
//!
//! [`RecordStore`] is the raw capability (list, read, write over
//! [`RecordKey`]s). [`Records`] layers the record schema on top of it:
//! encoding, validation on load, and the skip-and-warn policy for records
//! that cannot be read.

mod fs;
mod key;
mod memory;

pub use fs::FsRecordStore;
pub use key::RecordKey;
pub use memory::MemoryRecordStore;

use crate::error::{Error, Result};
use crate::models::{Item, PackBox};

/// Raw record storage over opaque keys.
pub trait RecordStore {
    /// Keys of every box record present, in ascending box id order.
    fn list_boxes(&self) -> Result<Vec<RecordKey>>;

    /// Body of a record, or `None` if it was never written.
    fn read(&self, key: &RecordKey) -> Result<Option<String>>;

    /// Replace the record's body.
    fn write(&mut self, key: &RecordKey, body: &str) -> Result<()>;
}

/// Typed access to box and reject records.
#[derive(Debug)]
pub struct Records<S> {
    store: S,
}

impl<S: RecordStore> Records<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Persist a box under its id, overwriting any earlier record.
    pub fn save_box(&mut self, pack_box: &PackBox) -> Result<()> {
        let key = RecordKey::Box(pack_box.id);
        let body = serde_json::to_string_pretty(pack_box)?;
        self.store.write(&key, &body)?;
        tracing::debug!(
            "Saved {} (closed={}, items={})",
            key,
            pack_box.closed,
            pack_box.len()
        );
        Ok(())
    }

    /// Lazily read every box record. Records that cannot be read or parsed
    /// are skipped with a warning.
    pub fn load_all_box_records(&self) -> Result<impl Iterator<Item = PackBox> + '_> {
        let keys = self.store.list_boxes()?;
        Ok(keys
            .into_iter()
            .filter_map(move |key| match self.load_box(&key) {
                Ok(Some(pack_box)) => Some(pack_box),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!("Skipping box record: {}", e);
                    None
                }
            }))
    }

    /// Read and validate a single box record.
    pub fn load_box(&self, key: &RecordKey) -> Result<Option<PackBox>> {
        let Some(body) = self.store.read(key)? else {
            return Ok(None);
        };
        let pack_box: PackBox =
            serde_json::from_str(&body).map_err(|e| Error::corrupt(key.to_string(), e))?;

        if RecordKey::Box(pack_box.id) != *key {
            return Err(Error::corrupt(
                key.to_string(),
                format!("record holds box id {}", pack_box.id),
            ));
        }
        validate_items(key, &pack_box.items)?;
        Ok(Some(pack_box))
    }

    /// Persist the whole reject set, replacing the previous record.
    pub fn save_rejects<'a>(&mut self, items: impl IntoIterator<Item = &'a Item>) -> Result<()> {
        let items: Vec<&Item> = items.into_iter().collect();
        let body = serde_json::to_string_pretty(&items)?;
        self.store.write(&RecordKey::Rejects, &body)?;
        tracing::debug!("Saved {} ({} items)", RecordKey::Rejects, items.len());
        Ok(())
    }

    /// Read the reject set. A missing record is an empty set; an unreadable
    /// one is treated as empty with a warning.
    pub fn load_rejects(&self) -> Vec<Item> {
        match self.try_load_rejects() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Treating reject set as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn try_load_rejects(&self) -> Result<Vec<Item>> {
        let key = RecordKey::Rejects;
        let Some(body) = self.store.read(&key)? else {
            return Ok(Vec::new());
        };
        let items: Vec<Item> =
            serde_json::from_str(&body).map_err(|e| Error::corrupt(key.to_string(), e))?;
        validate_items(&key, &items)?;
        Ok(items)
    }
}

fn validate_items(key: &RecordKey, items: &[Item]) -> Result<()> {
    for item in items {
        item.validate()
            .map_err(|reason| Error::corrupt(key.to_string(), reason))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved(id: &str) -> Item {
        Item {
            id: id.to_string(),
            weight: 100.0,
            color: "azul".to_string(),
            length: 15.0,
            approved: true,
            failure_reasons: vec![],
        }
    }

    #[test]
    fn test_box_record_layout() {
        let mut records = Records::new(MemoryRecordStore::new());
        let mut pack_box = PackBox::open(3);
        pack_box.items.push(approved("P1"));
        records.save_box(&pack_box).unwrap();

        let raw = records.backend().raw("box_0003").unwrap();
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["closed"], false);
        assert_eq!(value["items"][0]["id"], "P1");
        assert_eq!(value["items"][0]["failure_reasons"], serde_json::json!([]));
    }

    #[test]
    fn test_box_with_mismatched_id_is_corrupt() {
        let mut store = MemoryRecordStore::new();
        store.insert_raw("box_0002", r#"{"id": 5, "closed": false, "items": []}"#);
        let records = Records::new(store);

        let err = records.load_box(&RecordKey::Box(2)).unwrap_err();
        assert!(matches!(err, Error::RecordCorrupt { .. }));
    }

    #[test]
    fn test_box_with_inconsistent_item_is_corrupt() {
        let mut store = MemoryRecordStore::new();
        store.insert_raw(
            "box_0001",
            r#"{"id": 1, "closed": true, "items": [
                {"id": "P1", "weight": 100, "color": "azul", "length": 15,
                 "approved": true, "failure_reasons": ["invalid color"]}
            ]}"#,
        );
        let records = Records::new(store);
        assert_eq!(records.load_all_box_records().unwrap().count(), 0);
    }

    #[test]
    fn test_rejects_record_is_a_plain_array() {
        let mut records = Records::new(MemoryRecordStore::new());
        let mut rejected = approved("R1");
        rejected.approved = false;
        rejected.failure_reasons = vec!["invalid color".to_string()];
        records.save_rejects([&rejected]).unwrap();

        let raw = records.backend().raw("rejects").unwrap();
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert!(value.is_array());
        assert_eq!(records.load_rejects(), vec![rejected]);
    }
}
