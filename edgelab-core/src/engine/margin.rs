//! Margin and P&L valuation for fixed-size unit positions.
//!
//! Every position trades `lot_size` lots of `contract_size` units. A price
//! excursion converts to account currency through the pip constants:
//! `pnl = excursion / pip_size * pip_value`.

use crate::domain::Side;

use super::config::EngineConfig;

#[derive(Debug, Clone, Copy)]
pub struct MarginModel {
    lot_size: f64,
    contract_size: f64,
    leverage: f64,
    pip_size: f64,
    pip_value: f64,
}

impl MarginModel {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            lot_size: config.lot_size,
            contract_size: config.contract_size,
            leverage: config.leverage,
            pip_size: config.pip_size,
            pip_value: config.pip_value,
        }
    }

    /// Margin required to hold one unit position.
    pub fn margin_per_position(&self) -> f64 {
        self.lot_size * self.contract_size / self.leverage
    }

    /// Unrealized or realized P&L of a unit position between `entry_price`
    /// and `price`, in account currency. Full precision; rounding happens at
    /// ledger emission.
    pub fn pnl(&self, side: Side, entry_price: f64, price: f64) -> f64 {
        side.sign() * (price - entry_price) / self.pip_size * self.pip_value
    }
}
