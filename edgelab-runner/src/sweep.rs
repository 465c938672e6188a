//! Parameter sweep — grid search across engine configurations.
//!
//! Runs are independent pure functions of (series, config), so the grid is
//! fanned across a rayon pool with no shared mutable state. Results come
//! back in a deterministic order regardless of worker scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use edgelab_core::domain::BarSeries;
use edgelab_core::engine::{run, ConfigError, EngineConfig};

use crate::metrics::PerformanceMetrics;

/// Parameter grid specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub ma_periods: Vec<usize>,
    pub trailing_stop_distances: Vec<f64>,
    pub breakeven_trigger_distances: Vec<f64>,
    pub loss_timeout_bars: Vec<u32>,
}

impl ParamGrid {
    /// A modest default grid around the strategy's usual parameters.
    pub fn standard() -> Self {
        Self {
            ma_periods: vec![5, 10, 20],
            trailing_stop_distances: vec![0.10, 0.15, 0.25],
            breakeven_trigger_distances: vec![0.03, 0.05, 0.10],
            loss_timeout_bars: vec![10, 15, 30],
        }
    }

    /// Total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.ma_periods.len()
            * self.trailing_stop_distances.len()
            * self.breakeven_trigger_distances.len()
            * self.loss_timeout_bars.len()
    }

    /// All configurations in the grid, in a fixed nesting order.
    pub fn generate_configs(&self, base: &EngineConfig) -> Vec<EngineConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &ma_period in &self.ma_periods {
            for &trailing in &self.trailing_stop_distances {
                for &breakeven in &self.breakeven_trigger_distances {
                    for &timeout in &self.loss_timeout_bars {
                        let mut config = base.clone();
                        config.ma_period = ma_period;
                        config.trailing_stop_distance = trailing;
                        config.breakeven_trigger_distance = breakeven;
                        config.loss_timeout_bars = timeout;
                        configs.push(config);
                    }
                }
            }
        }
        configs
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub config: EngineConfig,
    pub metrics: PerformanceMetrics,
    pub final_equity: f64,
    pub stopped_out: bool,
}

/// Evaluate every grid point against one shared series, best final equity
/// first. Ties keep grid order, so the ranking is stable.
pub fn run_sweep(
    series: &BarSeries,
    grid: &ParamGrid,
    base: &EngineConfig,
) -> Result<Vec<SweepOutcome>, ConfigError> {
    let configs = grid.generate_configs(base);

    let mut outcomes = configs
        .into_par_iter()
        .map(|config| {
            let result = run(series, &config)?;
            let metrics = PerformanceMetrics::compute(&result.equity_curve, result.ledger.trades());
            Ok(SweepOutcome {
                config,
                metrics,
                final_equity: result.final_equity,
                stopped_out: result.stopped_out,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    outcomes.sort_by(|a, b| {
        b.final_equity
            .partial_cmp(&a.final_equity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(outcomes)
}
