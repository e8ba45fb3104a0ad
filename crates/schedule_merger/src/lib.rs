//! Combines the current schedule, the previously published snapshot and fresh
//! video metadata into the enriched schedule.

pub mod overlay;
pub mod recency;

mod merge;

pub use merge::merge;
pub use overlay::Overlay;
pub use recency::{RECENCY_WINDOW_HOURS, recency_window, within_window};
