//! Performance metrics — pure functions that compute run statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in,
//! scalar out. No dependencies on the loader or the engine loop.

use serde::{Deserialize, Serialize};

use edgelab_core::domain::Trade;

/// Aggregate performance metrics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_pnl: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl PerformanceMetrics {
    pub fn compute(equity_curve: &[f64], trades: &[Trade]) -> Self {
        Self {
            total_pnl: trades.iter().map(|t| t.pnl).sum(),
            total_return: total_return(equity_curve),
            max_drawdown: max_drawdown(equity_curve),
            trade_count: trades.len(),
            wins: trades.iter().filter(|t| t.pnl > 0.0).count(),
            losses: trades.iter().filter(|t| t.pnl < 0.0).count(),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            average_win: average_win(trades),
            average_loss: average_loss(trades),
            best_trade: trades.iter().map(|t| t.pnl).fold(0.0, f64::max),
            worst_trade: trades.iter().map(|t| t.pnl).fold(0.0, f64::min),
            max_consecutive_wins: longest_streak(trades, |pnl| pnl > 0.0),
            max_consecutive_losses: longest_streak(trades, |pnl| pnl < 0.0),
        }
    }
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&initial), Some(&last)) if initial > 0.0 => (last - initial) / initial,
        _ => 0.0,
    }
}

/// Maximum peak-to-trough drawdown as a fraction of the peak.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &equity in equity_curve {
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.max((peak - equity) / peak);
        }
    }
    worst
}

/// Winning trades as a fraction of all trades. Zero trades yields 0.0.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.pnl > 0.0).count() as f64 / trades.len() as f64
}

/// Gross profit over gross loss. No losses yields infinity when there is
/// any profit, 0.0 otherwise.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades.iter().map(|t| t.pnl.max(0.0)).sum();
    let gross_loss: f64 = trades.iter().map(|t| (-t.pnl).max(0.0)).sum();
    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

fn average_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|&p| p > 0.0).collect();
    if wins.is_empty() {
        0.0
    } else {
        wins.iter().sum::<f64>() / wins.len() as f64
    }
}

fn average_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|&p| p < 0.0).collect();
    if losses.is_empty() {
        0.0
    } else {
        losses.iter().sum::<f64>() / losses.len() as f64
    }
}

fn longest_streak(trades: &[Trade], matches: impl Fn(f64) -> bool) -> usize {
    let mut best = 0usize;
    let mut current = 0usize;
    for trade in trades {
        if matches(trade.pnl) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}
