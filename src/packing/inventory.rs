use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::models::{Item, PackBox};

/// In-memory indexes over every known item and box.
///
/// Each item has one authoritative entry in the id map. Approved ids appear
/// in box order (closed boxes by id, then the open box); rejected ids appear
/// in reject-record order. Exactly one box is open.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub(crate) items: HashMap<String, Item>,
    pub(crate) approved_ids: Vec<String>,
    pub(crate) rejected_ids: Vec<String>,
    pub(crate) closed_boxes: Vec<PackBox>,
    pub(crate) open_box: PackBox,
    /// Closed boxes whose record still says open. Rewrites keep that flag.
    pub(crate) open_on_record: BTreeSet<u32>,
}

impl Inventory {
    pub(crate) fn empty(open_box: PackBox) -> Self {
        Self {
            items: HashMap::new(),
            approved_ids: Vec::new(),
            rejected_ids: Vec::new(),
            closed_boxes: Vec::new(),
            open_box,
            open_on_record: BTreeSet::new(),
        }
    }

    pub fn items(&self) -> &HashMap<String, Item> {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn approved_ids(&self) -> &[String] {
        &self.approved_ids
    }

    pub fn rejected_ids(&self) -> &[String] {
        &self.rejected_ids
    }

    pub fn closed_boxes(&self) -> &[PackBox] {
        &self.closed_boxes
    }

    pub fn open_box(&self) -> &PackBox {
        &self.open_box
    }

    pub fn approved_items(&self) -> impl Iterator<Item = &Item> {
        self.approved_ids.iter().filter_map(|id| self.items.get(id))
    }

    pub fn rejected_items(&self) -> impl Iterator<Item = &Item> {
        self.rejected_ids.iter().filter_map(|id| self.items.get(id))
    }

    /// Every box, closed ones first, then the open box.
    pub fn boxes(&self) -> impl Iterator<Item = &PackBox> {
        self.closed_boxes
            .iter()
            .chain(std::iter::once(&self.open_box))
    }

    /// Id for a newly created box: one past the largest id known.
    pub(crate) fn next_box_id(&self) -> Result<u32> {
        successor_id(self.boxes().map(|b| b.id).max())
    }

    /// The box as its record should be written: demoted boxes keep the
    /// open flag they were loaded with.
    pub(crate) fn as_recorded(&self, mut pack_box: PackBox) -> PackBox {
        if self.open_on_record.contains(&pack_box.id) {
            pack_box.closed = false;
        }
        pack_box
    }

    /// Add an item to the id map. Returns false, leaving the map untouched,
    /// when the id is already known.
    pub(crate) fn index(&mut self, item: &Item) -> bool {
        if self.items.contains_key(&item.id) {
            return false;
        }
        self.items.insert(item.id.clone(), item.clone());
        true
    }
}

/// One past `max_id`, or 1 when there are no boxes.
pub(crate) fn successor_id(max_id: Option<u32>) -> Result<u32> {
    match max_id {
        None => Ok(1),
        Some(id) => id
            .checked_add(1)
            .ok_or_else(|| Error::BoxIdsExhausted(id)),
    }
}
