//! Shared utilities.
//!
//! - [`SharedCell`] - an `Arc`-swapping cell updated by optimistic compare-and-swap

mod cell;

pub use cell::{SharedCell, Update};
