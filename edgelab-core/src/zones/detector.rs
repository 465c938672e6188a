//! Zone detection: resample, find swing points, cluster into levels.
//!
//! Clustering is a greedy single left-to-right sweep over the sorted swing
//! prices: each price either merges into the nearest-preceding cluster
//! (distance test against that cluster's running mean) or starts a new one.
//! The result is order-dependent but deterministic for sorted input; no
//! multi-pass reclustering happens. A cluster qualifies as a usable level
//! once it has at least two touches.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, BarSeries, TimeFrame};

use super::{Zone, ZoneSet};

/// Minimum touches for a cluster to qualify as a level.
const MIN_TOUCHES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Timeframes whose swing points feed the cluster pool.
    pub timeframes: Vec<TimeFrame>,
    /// Bars on each side a swing extremum must strictly exceed.
    pub window: usize,
    /// Merge distance as a fraction of price.
    pub cluster_threshold: f64,
    /// When false, support and resistance share one symmetric cluster set.
    /// When true, swing lows cluster into support and swing highs into
    /// resistance independently.
    pub split_sides: bool,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            timeframes: vec![TimeFrame::H1, TimeFrame::H4, TimeFrame::D1],
            window: 3,
            cluster_threshold: 0.0015,
            split_sides: false,
        }
    }
}

/// Swing prices of one resampled series: (highs, lows).
///
/// A bar is a swing high if its high strictly exceeds the highs of every one
/// of the `window` bars on each side; symmetrically for swing lows.
fn swing_points(bars: &[Bar], window: usize) -> (Vec<f64>, Vec<f64>) {
    let mut highs = Vec::new();
    let mut lows = Vec::new();
    if bars.len() < 2 * window + 1 {
        return (highs, lows);
    }

    for i in window..bars.len() - window {
        let candidate_high = bars[i].high;
        let candidate_low = bars[i].low;
        let neighbors = bars[i - window..i].iter().chain(&bars[i + 1..=i + window]);

        let mut is_high = true;
        let mut is_low = true;
        for neighbor in neighbors {
            if candidate_high <= neighbor.high {
                is_high = false;
            }
            if candidate_low >= neighbor.low {
                is_low = false;
            }
            if !is_high && !is_low {
                break;
            }
        }

        if is_high {
            highs.push(candidate_high);
        }
        if is_low {
            lows.push(candidate_low);
        }
    }

    (highs, lows)
}

/// Greedy 1-D clustering of a price pool. Sorts ascending, then merges each
/// price into the last-created cluster when within `threshold` of its running
/// mean.
fn cluster(mut prices: Vec<f64>, threshold: f64) -> Vec<Zone> {
    prices.sort_by(|a, b| a.partial_cmp(b).expect("swing prices are finite"));

    let mut zones: Vec<Zone> = Vec::new();
    for price in prices {
        match zones.last_mut() {
            Some(last) if (price - last.level).abs() <= price * threshold => last.absorb(price),
            _ => zones.push(Zone::seed(price)),
        }
    }
    zones
}

fn qualifying(zones: Vec<Zone>) -> Vec<Zone> {
    zones.into_iter().filter(|z| z.touches >= MIN_TOUCHES).collect()
}

/// Detect support/resistance zones for a series.
///
/// An empty series (or one too short to contain any swing) yields an empty
/// zone set, not an error.
pub fn detect_zones(series: &BarSeries, config: &ZoneConfig) -> ZoneSet {
    let mut high_pool = Vec::new();
    let mut low_pool = Vec::new();

    for &timeframe in &config.timeframes {
        let resampled = series.resample(timeframe);
        let (highs, lows) = swing_points(&resampled, config.window);
        high_pool.extend(highs);
        low_pool.extend(lows);
    }

    if config.split_sides {
        ZoneSet {
            support: qualifying(cluster(low_pool, config.cluster_threshold)),
            resistance: qualifying(cluster(high_pool, config.cluster_threshold)),
        }
    } else {
        let mut pool = high_pool;
        pool.extend(low_pool);
        let levels = qualifying(cluster(pool, config.cluster_threshold));
        ZoneSet {
            support: levels.clone(),
            resistance: levels,
        }
    }
}
