//! Account state: realized balance plus the open position set.
//!
//! Equity, margin used, margin level, and free margin are always derived,
//! never stored. The balance mutates only when a position closes.

use serde::{Deserialize, Serialize};

use super::position::Position;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: f64,
    pub open: Vec<Position>,
}

impl AccountState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            open: Vec::new(),
        }
    }

    /// Sum of unrealized P&L across open positions.
    pub fn floating_pnl(&self) -> f64 {
        self.open.iter().map(|p| p.floating_pnl).sum()
    }

    /// Balance plus floating P&L.
    pub fn equity(&self) -> f64 {
        self.balance + self.floating_pnl()
    }

    /// Margin committed to the open set, given the per-position requirement.
    pub fn margin_used(&self, margin_per_position: f64) -> f64 {
        self.open.len() as f64 * margin_per_position
    }

    /// Equity as a percentage of margin used. Unbounded with nothing open,
    /// so a flat account can never trip a stop-out.
    pub fn margin_level_pct(&self, margin_per_position: f64) -> f64 {
        let used = self.margin_used(margin_per_position);
        if used > 0.0 {
            self.equity() / used * 100.0
        } else {
            f64::INFINITY
        }
    }

    /// Equity not committed as margin.
    pub fn free_margin(&self, margin_per_position: f64) -> f64 {
        self.equity() - self.margin_used(margin_per_position)
    }
}
