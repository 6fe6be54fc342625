//! Box packing state and the operations that mutate it.
//!
//! - [`reconstruct`] derives an [`Inventory`] from persisted records only.
//! - [`PackingLine`] owns the inventory and its record store and performs
//!   `register`, `store`, `reject` and `remove`.

mod inventory;
mod line;
mod reconstruct;

pub use inventory::Inventory;
pub use line::{PackingLine, Placement};
pub use reconstruct::reconstruct;
