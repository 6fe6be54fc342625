use std::path::{Path, PathBuf};

use super::{RecordKey, RecordStore};
use crate::error::Result;

const BOXES_DIR: &str = "boxes";
const EXTENSION: &str = "json";

/// JSON files under a data directory:
///
/// ```text
/// <root>/boxes/box_0001.json
/// <root>/boxes/box_0002.json
/// <root>/rejects.json
/// ```
#[derive(Debug, Clone)]
pub struct FsRecordStore {
    root: PathBuf,
}

impl FsRecordStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join(BOXES_DIR))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &RecordKey) -> PathBuf {
        let file = format!("{}.{}", key, EXTENSION);
        match key {
            RecordKey::Box(_) => self.root.join(BOXES_DIR).join(file),
            RecordKey::Rejects => self.root.join(file),
        }
    }
}

impl RecordStore for FsRecordStore {
    fn list_boxes(&self) -> Result<Vec<RecordKey>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(self.root.join(BOXES_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(RecordKey::parse);
            if let Some(key @ RecordKey::Box(_)) = key {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn read(&self, key: &RecordKey) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &RecordKey, body: &str) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, body)?;
        Ok(())
    }
}
