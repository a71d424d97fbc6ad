//! Page Data
//!
//! Per-view data loading keyed by an owning identity (the signed-in user id):
//! one fetch per identity change, debounced refetch on resume, and a first-load flag
//! for skeleton UI.

mod clock;
mod controller;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{FetchOutcome, Loader, PageDataController, ResumeTrigger, Sink};
