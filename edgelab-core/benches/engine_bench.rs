//! Criterion benchmarks for engine hot paths.
//!
//! Benchmarks:
//! 1. Full simulation run over a synthetic minute series
//! 2. Zone detection (resample + swing scan + clustering)
//! 3. Rolling SMA precompute

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use edgelab_core::domain::{Bar, BarSeries};
use edgelab_core::engine::{run, EngineConfig, StopOutPolicy};
use edgelab_core::indicators::rolling_close_sma;
use edgelab_core::zones::{detect_zones, ZoneConfig};

fn make_series(n: usize) -> BarSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bars: Vec<Bar> = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 2.0 + (i as f64 * 0.013).cos();
            Bar {
                timestamp: base + chrono::Duration::minutes(i as i64),
                open: close - 0.03,
                high: close + 0.15,
                low: close - 0.15,
                close,
            }
        })
        .collect();
    BarSeries::new(bars).expect("synthetic series is valid")
}

fn bench_config() -> EngineConfig {
    EngineConfig {
        ma_period: 10,
        trailing_stop_distance: 1.5,
        breakeven_trigger_distance: 0.5,
        loss_timeout_bars: 15,
        initial_balance: 10_000.0,
        leverage: 100.0,
        contract_size: 100.0,
        lot_size: 1.0,
        pip_size: 1.0,
        pip_value: 1.0,
        stop_out_policy: StopOutPolicy::Halt,
        ..EngineConfig::default()
    }
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_run");
    for &n in &[1_000usize, 10_000] {
        let series = make_series(n);
        let config = bench_config();
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, series| {
            b.iter(|| run(black_box(series), black_box(&config)).unwrap());
        });
    }
    group.finish();
}

fn bench_zone_detection(c: &mut Criterion) {
    let series = make_series(10_000);
    let config = ZoneConfig::default();
    c.bench_function("detect_zones_10k", |b| {
        b.iter(|| detect_zones(black_box(&series), black_box(&config)));
    });
}

fn bench_sma(c: &mut Criterion) {
    let series = make_series(10_000);
    c.bench_function("rolling_sma_10k", |b| {
        b.iter(|| rolling_close_sma(black_box(series.bars()), black_box(10)));
    });
}

criterion_group!(benches, bench_full_run, bench_zone_detection, bench_sma);
criterion_main!(benches);
