use serde::{Deserialize, Serialize};

use super::Item;

/// A box of approved items.
///
/// Ids are assigned sequentially when the box is created and never change.
/// `closed` is one-way: once sealed a box accepts no new items, and removing
/// items from it does not reopen it, so a closed box may hold fewer items
/// than the configured capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackBox {
    pub id: u32,
    #[serde(default)]
    pub closed: bool,
    /// Items in insertion order.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl PackBox {
    /// A fresh, empty, open box.
    pub fn open(id: u32) -> Self {
        Self {
            id,
            closed: false,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self, capacity: usize) -> bool {
        self.items.len() >= capacity
    }

    pub fn position_of(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == item_id)
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }
}
