//! Quality control and box packing for inspected parts.
//!
//! Parts are evaluated against weight, color and length thresholds. Approved
//! parts fill fixed-capacity boxes in sequence; rejected parts go to a single
//! reject set. All state is rebuilt on startup from independent per-box
//! records plus one reject record.

pub mod config;
pub mod db;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod packing;
pub mod report;
pub mod store;

pub use error::{Error, Result};
