//! Domain models for quality control and packing.
//!
//! # Core Concepts
//!
//! - [`Item`]: An inspected part. Classified once by the evaluator and never
//!   mutated afterwards; removal deletes it outright.
//! - [`PackBox`]: A fixed-capacity box filled in insertion order. Boxes start
//!   open and are sealed exactly once. A sealed box stays sealed even when
//!   items are later removed from it.
//! - [`FailureCheck`]: The three quality checks, in evaluation order.
//!
//! These types double as the persisted record schema; see [`crate::store`].

mod item;
mod pack_box;

pub use item::*;
pub use pack_box::*;
