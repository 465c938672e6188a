//! Support/resistance zones: multi-timeframe swing detection and clustering.

pub mod detector;

pub use detector::{detect_zones, ZoneConfig};

use serde::{Deserialize, Serialize};

/// A clustered price level.
///
/// `level` is the running mean of `members`; `touches` counts the swing
/// prices that merged into the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub level: f64,
    pub touches: u32,
    pub members: Vec<f64>,
}

impl Zone {
    fn seed(price: f64) -> Self {
        Self {
            level: price,
            touches: 1,
            members: vec![price],
        }
    }

    fn absorb(&mut self, price: f64) {
        self.touches += 1;
        self.members.push(price);
        self.level = self.members.iter().sum::<f64>() / self.members.len() as f64;
    }
}

/// Qualified support and resistance levels for one simulation run.
/// Produced once, read-only afterward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
    pub support: Vec<Zone>,
    pub resistance: Vec<Zone>,
}

impl ZoneSet {
    /// True when `price` lies within `tolerance` (a fraction of price) of any
    /// qualified level on either side.
    pub fn is_near(&self, price: f64, tolerance: f64) -> bool {
        self.support
            .iter()
            .chain(self.resistance.iter())
            .any(|zone| (price - zone.level).abs() <= price * tolerance)
    }

    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.resistance.is_empty()
    }
}
