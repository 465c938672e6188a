//! Engine configuration and eager validation.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::zones::ZoneConfig;

/// What the engine does when margin level falls below the stop-out threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutPolicy {
    /// Force-liquidate every open position and end the run.
    Halt,
    /// Force-liquidate every open position, then keep scanning for new
    /// signals on later bars.
    LiquidateAndResume,
}

/// Time-of-day window for new entries, inclusive on both ends.
/// Open positions advance on every bar regardless of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TradingWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Rejected configurations, surfaced before any bar is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ma_period must be >= 1")]
    MaPeriod,

    #[error("max_open_positions must be >= 1")]
    MaxOpenPositions,

    #[error("{name} must be > 0, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be >= 0, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("zone window must be >= 1")]
    ZoneWindow,
}

/// Complete configuration for one simulation run.
///
/// A run is a pure function of (bar series, config); nothing here is ambient
/// state, so configs can be fanned across parallel workers freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rolling close SMA period feeding the signal detector.
    pub ma_period: usize,
    /// Trailing stop distance from the watermark, in price units.
    pub trailing_stop_distance: f64,
    /// Favorable excursion from entry that activates trailing, in price
    /// units. Zero activates trailing immediately.
    pub breakeven_trigger_distance: f64,
    /// Bars after which a losing position is cut, unless near a zone.
    pub loss_timeout_bars: u32,
    /// Zone proximity tolerance as a fraction of price (entries and the
    /// timeout guard).
    pub sr_proximity_tolerance: f64,
    /// Require entries to sit near a detected zone.
    pub require_zone_confluence: bool,
    pub max_open_positions: usize,
    pub initial_balance: f64,
    pub leverage: f64,
    pub contract_size: f64,
    /// Lots per position (e.g. 0.01).
    pub lot_size: f64,
    /// Price units per pip.
    pub pip_size: f64,
    /// Account currency per pip for one position of `lot_size` lots.
    pub pip_value: f64,
    /// Margin level (percent) below which the stop-out policy fires.
    pub stop_out_margin_level_pct: f64,
    /// Stop-out behavior. No universally right answer; TOML configs must
    /// state it explicitly.
    pub stop_out_policy: StopOutPolicy,
    pub trading_window: Option<TradingWindow>,
    pub zones: ZoneConfig,
}

impl EngineConfig {
    /// Reject invalid configurations before the first bar.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ma_period < 1 {
            return Err(ConfigError::MaPeriod);
        }
        if self.max_open_positions < 1 {
            return Err(ConfigError::MaxOpenPositions);
        }
        for (name, value) in [
            ("leverage", self.leverage),
            ("initial_balance", self.initial_balance),
            ("contract_size", self.contract_size),
            ("lot_size", self.lot_size),
            ("pip_size", self.pip_size),
            ("pip_value", self.pip_value),
            ("trailing_stop_distance", self.trailing_stop_distance),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        for (name, value) in [
            ("breakeven_trigger_distance", self.breakeven_trigger_distance),
            ("sr_proximity_tolerance", self.sr_proximity_tolerance),
            ("stop_out_margin_level_pct", self.stop_out_margin_level_pct),
            ("zone_cluster_threshold", self.zones.cluster_threshold),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if self.zones.window < 1 {
            return Err(ConfigError::ZoneWindow);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ma_period: 10,
            trailing_stop_distance: 0.15,
            breakeven_trigger_distance: 0.05,
            loss_timeout_bars: 15,
            sr_proximity_tolerance: 0.002,
            require_zone_confluence: false,
            max_open_positions: 4,
            initial_balance: 100.0,
            leverage: 2000.0,
            contract_size: 100_000.0,
            lot_size: 0.01,
            pip_size: 0.01,
            pip_value: 0.07,
            stop_out_margin_level_pct: 25.0,
            stop_out_policy: StopOutPolicy::Halt,
            trading_window: None,
            zones: ZoneConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_ma_period() {
        let config = EngineConfig {
            ma_period: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MaPeriod)));
    }

    #[test]
    fn rejects_zero_max_open_positions() {
        let config = EngineConfig {
            max_open_positions: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MaxOpenPositions)
        ));
    }

    #[test]
    fn rejects_nonpositive_leverage() {
        let config = EngineConfig {
            leverage: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "leverage",
                ..
            })
        ));
    }

    #[test]
    fn rejects_negative_breakeven_trigger() {
        let config = EngineConfig {
            breakeven_trigger_distance: -0.1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Negative { .. })));
    }

    #[test]
    fn trading_window_is_inclusive() {
        let window = TradingWindow {
            start: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        };
        assert!(window.contains(NaiveTime::from_hms_opt(7, 30, 0).unwrap()));
        assert!(window.contains(NaiveTime::from_hms_opt(11, 0, 0).unwrap()));
        assert!(window.contains(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(!window.contains(NaiveTime::from_hms_opt(11, 0, 1).unwrap()));
        assert!(!window.contains(NaiveTime::from_hms_opt(7, 29, 59).unwrap()));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = EngineConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
