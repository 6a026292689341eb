//! Symptom attribution and ranking.
//!
//! Matches symptoms to the consumptions that preceded them within the onset
//! window, accumulates per-consumable danger scores, then filters and ranks
//! the consumables from safest to most dangerous.

pub mod aggregate;
pub mod analyzer;
pub mod rank;
pub mod types;
pub mod utility;
pub mod window;
