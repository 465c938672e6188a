//! BarSeries — validated, ordered, immutable sequence of bars.
//!
//! The only way to construct a `BarSeries` is through `new()`, which rejects
//! malformed bars and non-monotonic timestamps. Every downstream component
//! (zones, signals, engine) can therefore assume a clean, strictly ordered
//! series and index into it freely.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::Bar;

/// Aggregation timeframe for resampling a minute series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl TimeFrame {
    /// Truncate a timestamp to the start of its aggregation period.
    pub fn bucket(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let date = ts.date();
        match self {
            TimeFrame::M5 | TimeFrame::M15 | TimeFrame::M30 => {
                let step = match self {
                    TimeFrame::M5 => 5,
                    TimeFrame::M15 => 15,
                    _ => 30,
                };
                let minute = ts.minute() / step * step;
                date.and_hms_opt(ts.hour(), minute, 0).expect("valid time")
            }
            TimeFrame::H1 => date.and_hms_opt(ts.hour(), 0, 0).expect("valid time"),
            TimeFrame::H4 => {
                let hour = ts.hour() / 4 * 4;
                date.and_hms_opt(hour, 0, 0).expect("valid time")
            }
            TimeFrame::D1 => date.and_hms_opt(0, 0, 0).expect("valid time"),
        }
    }
}

/// Rejection reasons for malformed input series.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("bar {index} at {timestamp} violates OHLC ordering (o={open} h={high} l={low} c={close})")]
    MalformedBar {
        index: usize,
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("timestamp at bar {index} ({current}) does not increase over previous bar ({previous})")]
    NonMonotonicTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// Ordered, immutable OHLC series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate and take ownership of a bar sequence.
    ///
    /// Fails on the first malformed bar or non-increasing timestamp; a
    /// rejected series produces no partial result.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::MalformedBar {
                    index,
                    timestamp: bar.timestamp,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(SeriesError::NonMonotonicTimestamp {
                    index,
                    previous: bars[index - 1].timestamp,
                    current: bar.timestamp,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Aggregate into a coarser timeframe: open = first, high = max,
    /// low = min, close = last within each period. Periods with no bars are
    /// simply absent from the output.
    ///
    /// Buckets of a monotonic series are contiguous, so a single forward walk
    /// suffices and output order matches input order.
    pub fn resample(&self, timeframe: TimeFrame) -> Vec<Bar> {
        let mut out: Vec<Bar> = Vec::new();
        for bar in &self.bars {
            let bucket = timeframe.bucket(bar.timestamp);
            match out.last_mut() {
                Some(current) if current.timestamp == bucket => {
                    current.high = current.high.max(bar.high);
                    current.low = current.low.min(bar.low);
                    current.close = bar.close;
                }
                _ => out.push(Bar {
                    timestamp: bucket,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                }),
            }
        }
        out
    }
}
