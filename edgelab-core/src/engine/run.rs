//! Bar-by-bar simulation loop — the heart of the engine.
//!
//! Five phases per bar, in a fixed order that is part of the contract:
//! 1. Advance open positions (bars-open, floating P&L, watermark)
//! 2. Breakeven/trailing activation
//! 3. Exit evaluation per position: trailing stop first, then loss timeout
//! 4. Account-level margin check on the surviving open set
//! 5. Entry evaluation (capacity and free-margin gated)
//!
//! Exits always precede entries within a bar, so a position can never open
//! and close on the same bar, and a closed slot frees capacity for the same
//! bar's entry.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountState, BarSeries, Ledger, Position, Trade};
use crate::indicators::rolling_close_sma;
use crate::signal::RetestBreakout;
use crate::zones::detect_zones;

use super::config::{ConfigError, EngineConfig, StopOutPolicy};
use super::margin::MarginModel;

/// Result of a complete simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Closed trades in close-time order.
    pub ledger: Ledger,
    /// Equity after each processed bar (ends at the stop-out bar under the
    /// halt policy).
    pub equity_curve: Vec<f64>,
    pub final_equity: f64,
    /// Whether the margin level ever fell below the stop-out threshold.
    pub stopped_out: bool,
    /// Total signals fired, including ones dropped by capacity or margin.
    pub signal_count: usize,
    /// High-water mark of simultaneously open positions.
    pub max_concurrent_positions: usize,
}

/// Run one simulation over a validated bar series.
///
/// Pure: same series + config always produces an identical result. Config
/// errors are rejected before any bar is touched; a series too short for the
/// MA warmup yields an empty ledger, not an error.
pub fn run(series: &BarSeries, config: &EngineConfig) -> Result<RunResult, ConfigError> {
    config.validate()?;

    let bars = series.bars();
    let model = MarginModel::from_config(config);
    let margin_per_position = model.margin_per_position();
    let detector = RetestBreakout::new(
        config.ma_period,
        config.require_zone_confluence,
        config.sr_proximity_tolerance,
    );
    let ma = rolling_close_sma(bars, config.ma_period);
    let zones = detect_zones(series, &config.zones);

    let mut account = AccountState::new(config.initial_balance);
    let mut ledger = Ledger::new();
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut stopped_out = false;
    let mut signal_count = 0usize;
    let mut max_concurrent_positions = 0usize;

    // Entries need MA values at index-1 and index-2 plus the cross history.
    let warmup = detector.warmup_bars();

    for (index, bar) in bars.iter().enumerate() {
        let close = bar.close;
        let time = bar.timestamp;

        // ─── Phases 1-3: advance open positions and evaluate exits ───
        let mut surviving = Vec::with_capacity(account.open.len());
        for mut pos in account.open.drain(..) {
            pos.bars_open += 1;
            pos.floating_pnl = model.pnl(pos.side, pos.entry_price, close);

            if !pos.trailing_active
                && pos.favorable_excursion(close) >= config.breakeven_trigger_distance
            {
                pos.trailing_active = true;
            }

            if pos.trailing_active {
                pos.update_watermark(close);
                if pos.stop_touched(close, config.trailing_stop_distance) {
                    // Fill at the stop level, not the close that crossed it.
                    let stop = pos.trailing_stop(config.trailing_stop_distance);
                    let pnl = model.pnl(pos.side, pos.entry_price, stop);
                    account.balance += pnl;
                    ledger.push(Trade::new(
                        pos.entry_time,
                        time,
                        pos.side,
                        pos.entry_price,
                        stop,
                        pnl,
                    ));
                    continue;
                }
            }

            // Cut stale losers, but not into a level.
            if pos.floating_pnl < 0.0
                && pos.bars_open >= config.loss_timeout_bars
                && !zones.is_near(close, config.sr_proximity_tolerance)
            {
                account.balance += pos.floating_pnl;
                ledger.push(Trade::new(
                    pos.entry_time,
                    time,
                    pos.side,
                    pos.entry_price,
                    close,
                    pos.floating_pnl,
                ));
                continue;
            }

            surviving.push(pos);
        }
        account.open = surviving;

        // ─── Phase 4: account-level margin check ───
        // Equity identity: stored floating P&L must agree with a fresh
        // mark-to-market of every open position.
        debug_assert!(
            {
                let marked: f64 = account
                    .open
                    .iter()
                    .map(|p| model.pnl(p.side, p.entry_price, close))
                    .sum();
                (account.equity() - (account.balance + marked)).abs() < 1e-9
            },
            "equity accounting violated at bar {index}"
        );
        let mut entries_blocked = false;
        if account.margin_level_pct(margin_per_position) < config.stop_out_margin_level_pct {
            stopped_out = true;
            for pos in std::mem::take(&mut account.open) {
                account.balance += pos.floating_pnl;
                ledger.push(Trade::new(
                    pos.entry_time,
                    time,
                    pos.side,
                    pos.entry_price,
                    close,
                    pos.floating_pnl,
                ));
            }
            match config.stop_out_policy {
                StopOutPolicy::Halt => {
                    equity_curve.push(account.equity());
                    break;
                }
                StopOutPolicy::LiquidateAndResume => entries_blocked = true,
            }
        }

        equity_curve.push(account.equity());

        // ─── Phase 5: entry evaluation ───
        if entries_blocked || index < warmup {
            continue;
        }
        if let Some(window) = &config.trading_window {
            if !window.contains(time.time()) {
                continue;
            }
        }
        if account.open.iter().any(|p| p.entry_time == time) {
            continue;
        }

        if let Some(signal) = detector.evaluate(bars, &ma, index, Some(&zones)) {
            signal_count += 1;
            if account.open.len() < config.max_open_positions
                && account.free_margin(margin_per_position) >= margin_per_position
            {
                account.open.push(Position::new(signal.side, time, close));
            }
        }
        max_concurrent_positions = max_concurrent_positions.max(account.open.len());
    }

    Ok(RunResult {
        ledger,
        equity_curve,
        final_equity: account.equity(),
        stopped_out,
        signal_count,
        max_concurrent_positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use chrono::NaiveDate;

    fn minute_series(closes: &[f64]) -> BarSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: base + chrono::Duration::minutes(i as i64),
                open: close,
                high: close + 0.02,
                low: close - 0.02,
                close,
            })
            .collect();
        BarSeries::new(bars).unwrap()
    }

    #[test]
    fn empty_series_yields_empty_result() {
        let series = BarSeries::new(Vec::new()).unwrap();
        let config = EngineConfig::default();
        let result = run(&series, &config).unwrap();
        assert!(result.ledger.is_empty());
        assert!(result.equity_curve.is_empty());
        assert_eq!(result.final_equity, config.initial_balance);
        assert!(!result.stopped_out);
    }

    #[test]
    fn short_series_yields_zero_trades() {
        // Fewer than ma_period + 2 bars: warmup never completes.
        let series = minute_series(&[143.5; 8]);
        let config = EngineConfig::default();
        let result = run(&series, &config).unwrap();
        assert!(result.ledger.is_empty());
        assert_eq!(result.equity_curve.len(), 8);
        assert_eq!(result.signal_count, 0);
    }

    #[test]
    fn flat_series_produces_no_signals() {
        let series = minute_series(&[143.5; 100]);
        let result = run(&series, &EngineConfig::default()).unwrap();
        assert_eq!(result.signal_count, 0);
        assert!(result.ledger.is_empty());
        assert_eq!(result.final_equity, 100.0);
    }

    #[test]
    fn invalid_config_is_rejected_before_bars() {
        let series = minute_series(&[143.5; 10]);
        let config = EngineConfig {
            leverage: -1.0,
            ..Default::default()
        };
        assert!(run(&series, &config).is_err());
    }

    #[test]
    fn equity_curve_tracks_balance_when_flat() {
        let series = minute_series(&[143.5; 20]);
        let result = run(&series, &EngineConfig::default()).unwrap();
        assert!(result.equity_curve.iter().all(|&e| e == 100.0));
    }
}
