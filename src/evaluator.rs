//! Quality evaluation of inspected parts.
//!
//! All three checks always run, so a rejected item lists every check it
//! failed, in [`FailureCheck::ALL`] order.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::models::{normalize_color, FailureCheck, Item, NewItem};

/// Acceptance limits. Ranges are inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub min_weight: f64,
    pub max_weight: f64,
    pub min_length: f64,
    pub max_length: f64,
    #[serde(deserialize_with = "deserialize_colors")]
    pub allowed_colors: BTreeSet<String>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_weight: 95.0,
            max_weight: 105.0,
            min_length: 10.0,
            max_length: 20.0,
            allowed_colors: ["azul", "verde"].iter().map(|c| c.to_string()).collect(),
        }
    }
}

fn deserialize_colors<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw.iter().map(|c| normalize_color(c)).collect())
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_weight <= self.max_weight) {
            return Err(Error::Config(format!(
                "min_weight {} exceeds max_weight {}",
                self.min_weight, self.max_weight
            )));
        }
        if !(self.min_length <= self.max_length) {
            return Err(Error::Config(format!(
                "min_length {} exceeds max_length {}",
                self.min_length, self.max_length
            )));
        }
        if self.allowed_colors.is_empty() {
            return Err(Error::Config("allowed_colors is empty".to_string()));
        }
        Ok(())
    }

    fn passes(&self, check: FailureCheck, weight: f64, color: &str, length: f64) -> bool {
        match check {
            FailureCheck::Weight => (self.min_weight..=self.max_weight).contains(&weight),
            FailureCheck::Color => self.allowed_colors.contains(color),
            FailureCheck::Length => (self.min_length..=self.max_length).contains(&length),
        }
    }
}

/// Outcome of evaluating one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub approved: bool,
    pub reasons: Vec<String>,
}

/// Evaluate raw attributes against the thresholds. Pure and deterministic.
pub fn evaluate(weight: f64, color: &str, length: f64, thresholds: &Thresholds) -> Verdict {
    let color = normalize_color(color);
    let reasons: Vec<String> = FailureCheck::ALL
        .iter()
        .filter(|check| !thresholds.passes(**check, weight, &color, length))
        .map(|check| check.reason().to_string())
        .collect();

    Verdict {
        approved: reasons.is_empty(),
        reasons,
    }
}

/// Evaluate a new part and build its classified [`Item`].
pub fn classify(input: NewItem, thresholds: &Thresholds) -> Item {
    let verdict = evaluate(input.weight, &input.color, input.length, thresholds);
    Item {
        id: input.id.trim().to_string(),
        weight: input.weight,
        color: normalize_color(&input.color),
        length: input.length,
        approved: verdict.approved,
        failure_reasons: verdict.reasons,
    }
}

/// Parse a weight or length typed by an operator. Accepts a decimal comma.
pub fn parse_measure(field: &str, text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} must be a number, got '{}'", field, text)))?;
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{} must be a finite number, got '{}'",
            field, text
        )));
    }
    Ok(value)
}
