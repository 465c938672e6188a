//! Open position state, owned exclusively by the engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::side::Side;

/// A position from entry until one exit condition fires.
///
/// `watermark` is the running extremum of close since entry in the adverse
/// direction (max for shorts, min for longs); the trailing stop sits a fixed
/// distance on the favorable side of it, so the stop only ever tightens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub side: Side,
    pub watermark: f64,
    pub trailing_active: bool,
    pub bars_open: u32,
    pub floating_pnl: f64,
}

impl Position {
    pub fn new(side: Side, entry_time: NaiveDateTime, entry_price: f64) -> Self {
        Self {
            entry_time,
            entry_price,
            side,
            watermark: entry_price,
            trailing_active: false,
            bars_open: 0,
            floating_pnl: 0.0,
        }
    }

    /// Favorable price travel from entry to `price`, in price units.
    /// Positive when the position is in profit.
    pub fn favorable_excursion(&self, price: f64) -> f64 {
        self.side.sign() * (price - self.entry_price)
    }

    /// Ratchet the watermark in the adverse direction only.
    pub fn update_watermark(&mut self, close: f64) {
        self.watermark = match self.side {
            Side::Short => self.watermark.max(close),
            Side::Long => self.watermark.min(close),
        };
    }

    /// Current trailing stop level: watermark offset by `distance` toward the
    /// favorable side.
    pub fn trailing_stop(&self, distance: f64) -> f64 {
        match self.side {
            Side::Short => self.watermark - distance,
            Side::Long => self.watermark + distance,
        }
    }

    /// Whether `close` has reached the trailing stop.
    pub fn stop_touched(&self, close: f64, distance: f64) -> bool {
        let stop = self.trailing_stop(distance);
        match self.side {
            Side::Short => close <= stop,
            Side::Long => close >= stop,
        }
    }
}
