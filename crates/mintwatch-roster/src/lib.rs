//! Token roster: the ordered, deduplicated, capacity-bounded collection
//! of enriched token records that drives the display.

pub mod roster;

pub use roster::{TokenRoster, DEFAULT_CAPACITY};
