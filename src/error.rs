use thiserror::Error;

/// Errors raised by the packing core and its record backends.
#[derive(Debug, Error)]
pub enum Error {
    #[error("an item with id '{0}' already exists")]
    DuplicateId(String),

    #[error("item '{0}' not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A persisted record failed to parse or failed schema validation.
    #[error("record '{key}' is corrupt: {reason}")]
    RecordCorrupt { key: String, reason: String },

    /// The largest box id on record has no successor.
    #[error("box id {0} is the largest possible; no new box can be opened")]
    BoxIdsExhausted(u32),

    #[error("invalid settings: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn corrupt(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::RecordCorrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
