//! Entry signal detection.

pub mod detector;

pub use detector::RetestBreakout;

use serde::{Deserialize, Serialize};

use crate::domain::Side;

/// An entry signal at a specific bar. Ephemeral: the engine consumes it at
/// the bar where it fires and never re-evaluates it later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub bar_index: usize,
    pub side: Side,
    /// Reference price for the entry (the firing bar's close).
    pub price: f64,
}
