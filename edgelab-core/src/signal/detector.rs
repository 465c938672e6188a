//! MA-retest breakout detector.
//!
//! A short fires at `index` when, in the two preceding bars, close crossed
//! below the rolling MA, the crossing bar's high retested the MA from below,
//! and the current bar's low breaks the minimum low of those two bars. The
//! long side mirrors every condition. Only bars at and before `index` are
//! read; the MA slice is the precomputed rolling close SMA aligned with the
//! bar slice.

use crate::domain::{Bar, Side};
use crate::zones::ZoneSet;

use super::Signal;

/// Entry signal detector over a bar slice and its precomputed MA.
#[derive(Debug, Clone)]
pub struct RetestBreakout {
    pub ma_period: usize,
    /// Require the close to sit near a detected zone (condition (d)).
    pub require_zone_confluence: bool,
    /// Proximity tolerance as a fraction of price, used with the zone filter.
    pub zone_tolerance: f64,
}

impl RetestBreakout {
    pub fn new(ma_period: usize, require_zone_confluence: bool, zone_tolerance: f64) -> Self {
        assert!(ma_period >= 1, "ma_period must be >= 1");
        assert!(zone_tolerance >= 0.0, "zone_tolerance must be >= 0");
        Self {
            ma_period,
            require_zone_confluence,
            zone_tolerance,
        }
    }

    /// Bars to skip before the first evaluation: the MA needs `ma_period`
    /// closes, and the cross conditions look two bars back.
    pub fn warmup_bars(&self) -> usize {
        self.ma_period + 2
    }

    /// Evaluate at `index`. At most one signal fires per bar; short is
    /// checked first, so it wins the (structurally impossible) tie.
    pub fn evaluate(
        &self,
        bars: &[Bar],
        ma: &[f64],
        index: usize,
        zones: Option<&ZoneSet>,
    ) -> Option<Signal> {
        self.short_at(bars, ma, index, zones)
            .or_else(|| self.long_at(bars, ma, index, zones))
    }

    fn guard(&self, bars: &[Bar], ma: &[f64], index: usize) -> bool {
        index >= 2
            && index < bars.len()
            && ma.len() == bars.len()
            && !ma[index - 1].is_nan()
            && !ma[index - 2].is_nan()
    }

    fn confluence_ok(&self, close: f64, zones: Option<&ZoneSet>) -> bool {
        if !self.require_zone_confluence {
            return true;
        }
        match zones {
            Some(set) => set.is_near(close, self.zone_tolerance),
            None => false,
        }
    }

    pub(crate) fn short_at(
        &self,
        bars: &[Bar],
        ma: &[f64],
        index: usize,
        zones: Option<&ZoneSet>,
    ) -> Option<Signal> {
        if !self.guard(bars, ma, index) {
            return None;
        }
        let now = &bars[index];
        let prev = &bars[index - 1];
        let prev2 = &bars[index - 2];

        let broke_below_ma = prev2.close > ma[index - 2] && prev.close < ma[index - 1];
        let retested_ma = prev.high >= ma[index - 1];
        let broke_prev_lows = now.low < prev.low.min(prev2.low);

        if broke_below_ma
            && retested_ma
            && broke_prev_lows
            && self.confluence_ok(now.close, zones)
        {
            return Some(Signal {
                bar_index: index,
                side: Side::Short,
                price: now.close,
            });
        }
        None
    }

    pub(crate) fn long_at(
        &self,
        bars: &[Bar],
        ma: &[f64],
        index: usize,
        zones: Option<&ZoneSet>,
    ) -> Option<Signal> {
        if !self.guard(bars, ma, index) {
            return None;
        }
        let now = &bars[index];
        let prev = &bars[index - 1];
        let prev2 = &bars[index - 2];

        let broke_above_ma = prev2.close < ma[index - 2] && prev.close > ma[index - 1];
        let retested_ma = prev.low <= ma[index - 1];
        let broke_prev_highs = now.high > prev.high.max(prev2.high);

        if broke_above_ma
            && retested_ma
            && broke_prev_highs
            && self.confluence_ok(now.close, zones)
        {
            return Some(Signal {
                bar_index: index,
                side: Side::Long,
                price: now.close,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::{Zone, ZoneSet};
    use chrono::NaiveDate;

    fn make_bar(minute: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, minute, 0)
                .unwrap(),
            open,
            high,
            low,
            close,
        }
    }

    /// Three bars engineered so a short fires at index 2 against ma = 100
    /// everywhere: prev2 closes above the MA, prev crosses below after
    /// retesting it, and the current bar breaks both prior lows.
    fn short_setup() -> (Vec<Bar>, Vec<f64>) {
        let bars = vec![
            make_bar(0, 100.4, 100.8, 100.1, 100.5), // above MA
            make_bar(1, 100.5, 100.6, 99.6, 99.7),   // crossed below, high retested 100
            make_bar(2, 99.7, 99.8, 99.4, 99.5),     // low 99.4 < min(99.6, 100.1)
        ];
        let ma = vec![100.0; 3];
        (bars, ma)
    }

    /// Mirrored long setup against ma = 100.
    fn long_setup() -> (Vec<Bar>, Vec<f64>) {
        let bars = vec![
            make_bar(0, 99.6, 99.9, 99.2, 99.5),     // below MA
            make_bar(1, 99.5, 100.4, 99.4, 100.3),   // crossed above, low retested 100
            make_bar(2, 100.3, 100.6, 100.2, 100.5), // high 100.6 > max(100.4, 99.9)
        ];
        let ma = vec![100.0; 3];
        (bars, ma)
    }

    #[test]
    fn short_fires_on_cross_retest_break() {
        let (bars, ma) = short_setup();
        let det = RetestBreakout::new(10, false, 0.0);
        let signal = det.evaluate(&bars, &ma, 2, None).unwrap();
        assert_eq!(signal.side, Side::Short);
        assert_eq!(signal.bar_index, 2);
        assert_eq!(signal.price, 99.5);
    }

    #[test]
    fn long_fires_on_mirrored_conditions() {
        let (bars, ma) = long_setup();
        let det = RetestBreakout::new(10, false, 0.0);
        let signal = det.evaluate(&bars, &ma, 2, None).unwrap();
        assert_eq!(signal.side, Side::Long);
        assert_eq!(signal.price, 100.5);
    }

    #[test]
    fn no_short_without_retest() {
        let (mut bars, ma) = short_setup();
        bars[1].open = 99.8;
        bars[1].high = 99.9; // never reached the MA
        let det = RetestBreakout::new(10, false, 0.0);
        assert!(det.evaluate(&bars, &ma, 2, None).is_none());
    }

    #[test]
    fn no_short_without_low_break() {
        let (mut bars, ma) = short_setup();
        bars[2].low = 99.7; // holds above min(prev lows)
        bars[2].close = 99.75;
        let det = RetestBreakout::new(10, false, 0.0);
        assert!(det.evaluate(&bars, &ma, 2, None).is_none());
    }

    #[test]
    fn no_short_without_cross() {
        let (mut bars, ma) = short_setup();
        bars[0].close = 99.9; // prev2 already below the MA
        bars[0].low = 99.5;
        let det = RetestBreakout::new(10, false, 0.0);
        assert!(det.evaluate(&bars, &ma, 2, None).is_none());
    }

    #[test]
    fn cross_directions_are_mutually_exclusive() {
        // Whatever fires on the short path must never also satisfy the long
        // path: the cross conditions compare the same closes against the same
        // MA values with opposite strict inequalities.
        let det = RetestBreakout::new(10, false, 0.0);
        for setup in [short_setup(), long_setup()] {
            let (bars, ma) = setup;
            let short = det.short_at(&bars, &ma, 2, None);
            let long = det.long_at(&bars, &ma, 2, None);
            assert!(
                short.is_none() || long.is_none(),
                "both sides fired on one bar"
            );
        }
    }

    #[test]
    fn short_is_checked_first() {
        // evaluate() consults the short path before the long path; on a
        // firing short setup the result must be the short signal.
        let (bars, ma) = short_setup();
        let det = RetestBreakout::new(10, false, 0.0);
        assert_eq!(det.evaluate(&bars, &ma, 2, None).unwrap().side, Side::Short);
    }

    #[test]
    fn warmup_nan_ma_suppresses_signal() {
        let (bars, mut ma) = short_setup();
        ma[1] = f64::NAN;
        let det = RetestBreakout::new(10, false, 0.0);
        assert!(det.evaluate(&bars, &ma, 2, None).is_none());
    }

    #[test]
    fn warmup_covers_ma_and_cross_history() {
        assert_eq!(RetestBreakout::new(10, false, 0.0).warmup_bars(), 12);
        assert_eq!(RetestBreakout::new(1, false, 0.0).warmup_bars(), 3);
    }

    #[test]
    fn index_below_two_never_fires() {
        let (bars, ma) = short_setup();
        let det = RetestBreakout::new(10, false, 0.0);
        assert!(det.evaluate(&bars, &ma, 0, None).is_none());
        assert!(det.evaluate(&bars, &ma, 1, None).is_none());
    }

    #[test]
    fn zone_confluence_filters_entries() {
        let (bars, ma) = short_setup();
        let det = RetestBreakout::new(10, true, 0.002);

        // No zones supplied: the filter cannot pass.
        assert!(det.evaluate(&bars, &ma, 2, None).is_none());

        // A zone far from the close: rejected.
        let far = ZoneSet {
            support: vec![Zone {
                level: 150.0,
                touches: 3,
                members: vec![150.0; 3],
            }],
            resistance: Vec::new(),
        };
        assert!(det.evaluate(&bars, &ma, 2, Some(&far)).is_none());

        // A zone right at the close: accepted.
        let near = ZoneSet {
            support: vec![Zone {
                level: 99.55,
                touches: 3,
                members: vec![99.55; 3],
            }],
            resistance: Vec::new(),
        };
        assert!(det.evaluate(&bars, &ma, 2, Some(&near)).is_some());
    }

    #[test]
    fn evaluation_reads_no_future_bars() {
        // Evaluating at the last index of a truncated slice must equal the
        // evaluation at the same index of the full slice.
        let (mut bars, _) = short_setup();
        bars.push(make_bar(3, 99.5, 99.6, 99.0, 99.1));
        bars.push(make_bar(4, 99.1, 99.3, 98.8, 99.0));
        let ma = vec![100.0; bars.len()];

        let det = RetestBreakout::new(10, false, 0.0);
        let full = det.evaluate(&bars, &ma, 2, None);
        let truncated = det.evaluate(&bars[..3], &ma[..3], 2, None);
        assert_eq!(full, truncated);
    }
}
