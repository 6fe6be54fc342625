//! Plain-text listings and the final report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::Result;
use crate::models::Item;
use crate::packing::Inventory;

const RULE: &str = "===";

/// Approved items, then rejected items with their reasons.
pub fn render_items(inventory: &Inventory) -> String {
    let mut out = String::new();

    heading(&mut out, "Approved items");
    if inventory.approved_ids().is_empty() {
        out.push_str("No approved items.\n");
    }
    for item in inventory.approved_items() {
        let _ = writeln!(out, "- {} | APPROVED", item_fields(item));
    }

    out.push('\n');
    heading(&mut out, "Rejected items");
    if inventory.rejected_ids().is_empty() {
        out.push_str("No rejected items.\n");
    }
    for item in inventory.rejected_items() {
        let _ = writeln!(
            out,
            "- {} | REJECTED ({})",
            item_fields(item),
            item.failure_reasons.join("; ")
        );
    }

    out
}

/// Every closed box with its contents.
pub fn render_closed_boxes(inventory: &Inventory) -> String {
    let mut out = String::new();
    heading(&mut out, "Closed boxes");
    if inventory.closed_boxes().is_empty() {
        out.push_str("No closed boxes.\n");
        return out;
    }
    for pack_box in inventory.closed_boxes() {
        let _ = writeln!(out, "- Box #{}: {} item(s) (closed)", pack_box.id, pack_box.len());
        for item in &pack_box.items {
            let _ = writeln!(
                out,
                "  • {} ({}g, {}, {}cm)",
                item.id, item.weight, item.color, item.length
            );
        }
    }
    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{} {} {}", RULE, title, RULE);
}

fn item_fields(item: &Item) -> String {
    format!(
        "{} | {}g | {} | {}cm",
        item.id, item.weight, item.color, item.length
    )
}

/// Totals over the current inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalReport {
    pub approved_total: usize,
    pub rejected_total: usize,
    /// Failure reasons with their counts, in first-seen order.
    pub reason_counts: Vec<(String, usize)>,
    pub closed_boxes: usize,
    pub open_box_id: u32,
    pub open_box_items: Vec<String>,
}

impl FinalReport {
    pub fn from_inventory(inventory: &Inventory) -> Self {
        let mut reason_counts: Vec<(String, usize)> = Vec::new();
        for reason in inventory
            .rejected_items()
            .flat_map(|item| item.failure_reasons.iter())
        {
            match reason_counts.iter_mut().find(|(r, _)| r == reason) {
                Some((_, count)) => *count += 1,
                None => reason_counts.push((reason.clone(), 1)),
            }
        }

        let open_box = inventory.open_box();
        Self {
            approved_total: inventory.approved_ids().len(),
            rejected_total: inventory.rejected_ids().len(),
            reason_counts,
            closed_boxes: inventory.closed_boxes().len(),
            open_box_id: open_box.id,
            open_box_items: open_box.item_ids().map(str::to_string).collect(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        heading(&mut out, "Final report");
        let _ = writeln!(out, "Approved items: {}", self.approved_total);
        let _ = writeln!(out, "Rejected items: {}", self.rejected_total);

        if !self.reason_counts.is_empty() {
            out.push_str("\nRejection reasons:\n");
            for (reason, count) in &self.reason_counts {
                let _ = writeln!(out, "- {}: {}", reason, count);
            }
        }

        let _ = writeln!(out, "\nClosed boxes: {}", self.closed_boxes);
        let _ = writeln!(
            out,
            "Items in open box (#{}): {}",
            self.open_box_id,
            self.open_box_items.len()
        );
        if !self.open_box_items.is_empty() {
            let _ = writeln!(out, "IDs: {}", self.open_box_items.join(", "));
        }
        out
    }

    /// Write the rendered report to `dir/report_YYYYmmdd_HHMMSS.txt`.
    pub fn save(&self, dir: &Path, at: DateTime<Local>) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("report_{}.txt", at.format("%Y%m%d_%H%M%S")));
        std::fs::write(&path, self.render())?;
        Ok(path)
    }
}
