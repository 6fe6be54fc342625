use std::collections::BTreeSet;

use super::inventory::successor_id;
use super::Inventory;
use crate::error::Result;
use crate::models::PackBox;
use crate::store::{RecordStore, Records};

/// Rebuild the in-memory indexes from persisted records alone.
///
/// Unreadable records are skipped (boxes) or read as empty (rejects) with a
/// warning. When no box record is open a new empty box is created and
/// persisted: id 1 on an empty store, otherwise one past the largest id.
///
/// If several box records are open, the one with the largest id stays open
/// and the rest are treated as closed in memory. Their records are left as
/// they are.
///
/// An id seen in more than one record keeps its first occurrence: closed
/// boxes by id, then the open box, then the reject record.
pub fn reconstruct<S: RecordStore>(records: &mut Records<S>) -> Result<Inventory> {
    let boxes: Vec<PackBox> = records.load_all_box_records()?.collect();
    let max_id = boxes.iter().map(|b| b.id).max();

    let (mut closed, mut open): (Vec<PackBox>, Vec<PackBox>) =
        boxes.into_iter().partition(|b| b.closed);
    open.sort_by_key(|b| b.id);

    let open_box = match open.pop() {
        Some(open_box) => open_box,
        None => {
            let open_box = PackBox::open(successor_id(max_id)?);
            records.save_box(&open_box)?;
            tracing::info!("Opened box #{} (no open box on record)", open_box.id);
            open_box
        }
    };

    let demoted_ids: BTreeSet<u32> = open.iter().map(|b| b.id).collect();
    if !open.is_empty() {
        let demoted: Vec<String> = open.iter().map(|b| format!("#{}", b.id)).collect();
        tracing::warn!(
            "Several open box records; keeping #{} open and treating {} as closed",
            open_box.id,
            demoted.join(", ")
        );
        for mut pack_box in open {
            pack_box.closed = true;
            closed.push(pack_box);
        }
    }
    closed.sort_by_key(|b| b.id);

    let mut inventory = Inventory::empty(open_box);
    inventory.open_on_record = demoted_ids;
    inventory.closed_boxes = closed;

    let boxed: Vec<_> = inventory.boxes().flat_map(|b| b.items.clone()).collect();
    for item in &boxed {
        if !inventory.index(item) {
            tracing::warn!("Item '{}' appears more than once; keeping the first", item.id);
            continue;
        }
        if item.approved {
            inventory.approved_ids.push(item.id.clone());
        }
    }

    for item in records.load_rejects() {
        if !inventory.index(&item) {
            tracing::warn!(
                "Rejected item '{}' is already indexed; ignoring the reject entry",
                item.id
            );
            continue;
        }
        inventory.rejected_ids.push(item.id);
    }

    tracing::debug!(
        "Reconstructed {} closed boxes, open box #{} ({} items), {} approved, {} rejected",
        inventory.closed_boxes.len(),
        inventory.open_box.id,
        inventory.open_box.len(),
        inventory.approved_ids.len(),
        inventory.rejected_ids.len()
    );

    Ok(inventory)
}
