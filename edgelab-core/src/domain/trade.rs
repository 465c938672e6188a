//! Closed trade records and the append-only ledger.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::side::Side;

/// Decimal places for prices emitted into the ledger.
const PRICE_DECIMALS: i32 = 5;
/// Decimal places for currency amounts emitted into the ledger.
const CURRENCY_DECIMALS: i32 = 2;

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Round a price to ledger precision (5 decimals).
pub fn round_price(value: f64) -> f64 {
    round_to(value, PRICE_DECIMALS)
}

/// Round a currency amount to ledger precision (2 decimals).
pub fn round_currency(value: f64) -> f64 {
    round_to(value, CURRENCY_DECIMALS)
}

/// Immutable closed-trade record.
///
/// Prices and P&L are rounded once, here, at emission. Internal engine
/// accounting stays at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
}

impl Trade {
    pub fn new(
        entry_time: NaiveDateTime,
        exit_time: NaiveDateTime,
        side: Side,
        entry_price: f64,
        exit_price: f64,
        pnl: f64,
    ) -> Self {
        Self {
            entry_time,
            exit_time,
            side,
            entry_price: round_price(entry_price),
            exit_price: round_price(exit_price),
            pnl: round_currency(pnl),
        }
    }
}

/// Append-only sequence of closed trades in close-time order.
///
/// Ties within a bar keep entry-time order because the engine walks its open
/// set in insertion order, and positions are inserted in entry order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    trades: Vec<Trade>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Running balance after each trade: previous balance + recorded P&L.
    pub fn running_balances(&self, initial_balance: f64) -> Vec<f64> {
        let mut balance = initial_balance;
        self.trades
            .iter()
            .map(|t| {
                balance += t.pnl;
                round_currency(balance)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap()
    }

    #[test]
    fn trade_rounds_at_emission() {
        let trade = Trade::new(ts(0), ts(5), Side::Short, 143.123456, 142.987654, 1.23456);
        assert_eq!(trade.entry_price, 143.12346);
        assert_eq!(trade.exit_price, 142.98765);
        assert_eq!(trade.pnl, 1.23);
    }

    #[test]
    fn running_balances_accumulate() {
        let mut ledger = Ledger::new();
        ledger.push(Trade::new(ts(0), ts(5), Side::Short, 143.5, 143.3, 1.40));
        ledger.push(Trade::new(ts(6), ts(9), Side::Short, 143.2, 143.4, -1.40));
        ledger.push(Trade::new(ts(10), ts(20), Side::Long, 143.1, 143.6, 3.50));

        assert_eq!(ledger.running_balances(100.0), vec![101.40, 100.0, 103.50]);
    }

    #[test]
    fn ledger_serializes_as_plain_array() {
        let mut ledger = Ledger::new();
        ledger.push(Trade::new(ts(0), ts(5), Side::Short, 143.5, 143.3, 1.4));
        let json = serde_json::to_string(&ledger).unwrap();
        assert!(json.starts_with('['));
        let back: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
