//! EdgeLab Runner — orchestration around the core engine.
//!
//! Everything here consumes the engine's `run(series, config)` interface
//! without reaching into its internals: CSV bar loading, serializable run
//! configuration with content-addressed IDs, performance metrics, artifact
//! export, and parameter search (grid sweep and genetic evolution).

pub mod config;
pub mod data_loader;
pub mod evolve;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigFileError, RunId};
pub use data_loader::{load_bars, LoadError};
pub use evolve::{evolve, EvolutionConfig, EvolutionResult};
pub use export::{write_equity_json, write_trades_csv, ExportError};
pub use metrics::PerformanceMetrics;
pub use runner::{run_single_backtest, BacktestResult, RunError, SCHEMA_VERSION};
pub use sweep::{run_sweep, ParamGrid, SweepOutcome};
