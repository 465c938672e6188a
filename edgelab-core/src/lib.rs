//! EdgeLab Core — intraday mean-reversion/breakout backtest engine.
//!
//! This crate contains the simulation engine and everything it owns:
//! - Domain types (bars, validated series, positions, trades, ledger, account)
//! - Support/resistance zone detection (resample, swing points, clustering)
//! - MA-retest breakout signal detection
//! - The bar-by-bar position lifecycle and margin loop
//!
//! A run is a pure function of (bar series, configuration): no I/O, no
//! ambient state, deterministic output. File loading, metrics, parameter
//! search, and artifact export live in `edgelab-runner`.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signal;
pub mod zones;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a parallel parameter search shares or
    /// moves across workers is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::BarSeries>();
        require_sync::<domain::BarSeries>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();
        require_send::<domain::Ledger>();
        require_sync::<domain::Ledger>();
        require_send::<domain::AccountState>();
        require_sync::<domain::AccountState>();

        require_send::<zones::Zone>();
        require_sync::<zones::Zone>();
        require_send::<zones::ZoneSet>();
        require_sync::<zones::ZoneSet>();
        require_send::<zones::ZoneConfig>();
        require_sync::<zones::ZoneConfig>();

        require_send::<signal::Signal>();
        require_sync::<signal::Signal>();

        require_send::<engine::EngineConfig>();
        require_sync::<engine::EngineConfig>();
        require_send::<engine::RunResult>();
        require_sync::<engine::RunResult>();
    }
}
