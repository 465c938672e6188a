//! Backtest runner — wires together loading, the engine, and metrics.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads the CSV named in the config, then runs.
//!   Used by the CLI.
//! - `run_backtest_from_data()`: takes a pre-loaded series. Used by tests
//!   and anything that already holds the data (sweep and evolve call the
//!   engine directly).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgelab_core::domain::{BarSeries, Ledger};
use edgelab_core::engine::{run, ConfigError, EngineConfig};

use crate::config::{BacktestConfig, ConfigFileError, RunId};
use crate::data_loader::{load_bars, LoadError};
use crate::metrics::PerformanceMetrics;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("config file error: {0}")]
    ConfigFile(#[from] ConfigFileError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub metrics: PerformanceMetrics,
    pub trades: Ledger,
    pub equity_curve: Vec<f64>,
    pub final_equity: f64,
    pub stopped_out: bool,
    pub signal_count: usize,
    pub bar_count: usize,
    pub initial_balance: f64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a single backtest from a `BacktestConfig` (loads the data file).
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    let series = load_bars(&config.data_path)?;
    run_backtest_from_data(&series, &config.engine, config.run_id())
}

/// Run a single backtest on a pre-loaded series.
pub fn run_backtest_from_data(
    series: &BarSeries,
    engine_config: &EngineConfig,
    run_id: RunId,
) -> Result<BacktestResult, RunError> {
    let result = run(series, engine_config)?;
    let metrics = PerformanceMetrics::compute(&result.equity_curve, result.ledger.trades());

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        metrics,
        trades: result.ledger,
        equity_curve: result.equity_curve,
        final_equity: result.final_equity,
        stopped_out: result.stopped_out,
        signal_count: result.signal_count,
        bar_count: series.len(),
        initial_balance: engine_config.initial_balance,
    })
}
