use serde::{Deserialize, Deserializer, Serialize};

/// An inspected part.
///
/// `approved` and `failure_reasons` are fixed by the evaluator when the item
/// is registered: an approved item has no reasons, a rejected item has at
/// least one. Items are never edited afterwards, only removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Weight in grams.
    pub weight: f64,
    /// Lowercase, trimmed color name.
    #[serde(deserialize_with = "deserialize_color")]
    pub color: String,
    /// Length in centimetres.
    pub length: f64,
    #[serde(default)]
    pub approved: bool,
    /// Reasons in check order (weight, color, length).
    #[serde(default)]
    pub failure_reasons: Vec<String>,
}

impl Item {
    /// Check the invariants a persisted item must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("item id is empty".to_string());
        }
        if self.approved && !self.failure_reasons.is_empty() {
            return Err(format!(
                "item '{}' is approved but carries failure reasons",
                self.id
            ));
        }
        if !self.approved && self.failure_reasons.is_empty() {
            return Err(format!(
                "item '{}' is rejected without failure reasons",
                self.id
            ));
        }
        Ok(())
    }
}

/// Normalize a color the way every stored item holds it.
pub fn normalize_color(color: &str) -> String {
    color.trim().to_lowercase()
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_color(&raw))
}

/// Raw attributes of a part awaiting registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub id: String,
    pub weight: f64,
    /// Any casing or surrounding whitespace; normalized on evaluation.
    pub color: String,
    pub length: f64,
}

/// The quality checks, in the order they are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCheck {
    Weight,
    Color,
    Length,
}

impl FailureCheck {
    pub const ALL: [FailureCheck; 3] = [Self::Weight, Self::Color, Self::Length];

    /// Reason recorded on an item that fails this check.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Weight => "weight out of range",
            Self::Color => "invalid color",
            Self::Length => "length out of range",
        }
    }
}
