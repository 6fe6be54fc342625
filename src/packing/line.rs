use super::{reconstruct, Inventory};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::evaluator::{self, Thresholds, Verdict};
use crate::models::{Item, NewItem, PackBox};
use crate::store::{RecordStore, Records};

/// Where a stored item ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub box_id: u32,
    /// The item filled its box, which is now closed.
    pub sealed: bool,
}

/// Owns the record store and the indexes, and applies every mutation.
///
/// Each mutation writes the affected record before touching the indexes,
/// so a failed write leaves the in-memory state as it was.
pub struct PackingLine<S> {
    records: Records<S>,
    thresholds: Thresholds,
    capacity: usize,
    inventory: Inventory,
}

impl<S: RecordStore> PackingLine<S> {
    /// Validate the settings and reconstruct state from the store.
    pub fn open(store: S, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let mut records = Records::new(store);
        let inventory = reconstruct(&mut records)?;
        Ok(Self {
            records,
            thresholds: settings.thresholds.clone(),
            capacity: settings.box_capacity,
            inventory,
        })
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn records(&self) -> &Records<S> {
        &self.records
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn evaluate(&self, weight: f64, color: &str, length: f64) -> Verdict {
        evaluator::evaluate(weight, color, length, &self.thresholds)
    }

    /// Evaluate a new part, then box it or add it to the reject set.
    pub fn register(&mut self, input: NewItem) -> Result<Item> {
        let id = input.id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("item id must not be empty".to_string()));
        }
        if self.inventory.contains(id) {
            return Err(Error::DuplicateId(id.to_string()));
        }

        let item = evaluator::classify(input, &self.thresholds);
        if item.approved {
            self.store(item.clone())?;
        } else {
            self.reject(item.clone())?;
        }
        Ok(item)
    }

    /// Append an approved item to the open box, sealing it at capacity.
    pub fn store(&mut self, item: Item) -> Result<Placement> {
        if !item.approved {
            return Err(Error::InvalidInput(format!(
                "item '{}' is not approved and cannot be boxed",
                item.id
            )));
        }
        if self.inventory.contains(&item.id) {
            return Err(Error::DuplicateId(item.id));
        }

        let mut filled = self.inventory.open_box.clone();
        filled.items.push(item.clone());
        let sealed = filled.is_full(self.capacity);
        let next_id = if sealed {
            filled.closed = true;
            Some(self.inventory.next_box_id()?)
        } else {
            None
        };
        self.records.save_box(&filled)?;

        let box_id = filled.id;
        self.inventory.index(&item);
        self.inventory.approved_ids.push(item.id);

        let Some(next_id) = next_id else {
            self.inventory.open_box = filled;
            return Ok(Placement { box_id, sealed });
        };

        tracing::info!("Box #{} sealed with {} items", box_id, filled.len());
        self.inventory.closed_boxes.push(filled);
        self.inventory.open_box = PackBox::open(next_id);
        self.records.save_box(&self.inventory.open_box)?;
        tracing::info!("Opened box #{}", self.inventory.open_box.id);

        Ok(Placement { box_id, sealed })
    }

    /// Add a rejected item to the reject set.
    pub fn reject(&mut self, item: Item) -> Result<()> {
        if item.approved {
            return Err(Error::InvalidInput(format!(
                "item '{}' is approved and cannot be rejected",
                item.id
            )));
        }
        if self.inventory.contains(&item.id) {
            return Err(Error::DuplicateId(item.id));
        }

        self.records
            .save_rejects(self.inventory.rejected_items().chain(std::iter::once(&item)))?;
        self.inventory.index(&item);
        self.inventory.rejected_ids.push(item.id);
        Ok(())
    }

    /// Remove an item from wherever it is held. Closed boxes stay closed.
    pub fn remove(&mut self, id: &str) -> Result<Item> {
        let item = self
            .inventory
            .item(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let holder = if item.approved {
            self.find_box(id).map(Holder::Box).or_else(|| self.find_reject(id))
        } else {
            self.find_reject(id)
                .or_else(|| self.find_box(id).map(Holder::Box))
        };

        match holder {
            Some(Holder::Box(slot)) => self.remove_from_box(slot, id)?,
            Some(Holder::Rejects) => {
                self.records
                    .save_rejects(self.inventory.rejected_items().filter(|i| i.id != id))?;
            }
            None => {}
        }

        self.inventory.approved_ids.retain(|x| x != id);
        self.inventory.rejected_ids.retain(|x| x != id);
        self.inventory.items.remove(id);
        tracing::info!("Removed item '{}'", id);
        Ok(item)
    }

    fn find_box(&self, id: &str) -> Option<BoxSlot> {
        if self.inventory.open_box.position_of(id).is_some() {
            return Some(BoxSlot::Open);
        }
        self.inventory
            .closed_boxes
            .iter()
            .position(|b| b.position_of(id).is_some())
            .map(BoxSlot::Closed)
    }

    fn find_reject(&self, id: &str) -> Option<Holder> {
        self.inventory
            .rejected_ids
            .iter()
            .any(|x| x == id)
            .then_some(Holder::Rejects)
    }

    fn remove_from_box(&mut self, slot: BoxSlot, id: &str) -> Result<()> {
        let current = match slot {
            BoxSlot::Open => &self.inventory.open_box,
            BoxSlot::Closed(index) => &self.inventory.closed_boxes[index],
        };
        let mut updated = current.clone();
        updated.items.retain(|item| item.id != id);
        self.records
            .save_box(&self.inventory.as_recorded(updated.clone()))?;

        match slot {
            BoxSlot::Open => self.inventory.open_box = updated,
            BoxSlot::Closed(index) => self.inventory.closed_boxes[index] = updated,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum BoxSlot {
    Open,
    Closed(usize),
}

#[derive(Debug, Clone, Copy)]
enum Holder {
    Box(BoxSlot),
    Rejects,
}
