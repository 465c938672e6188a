//! Minute-bar CSV loading.
//!
//! Expected layout: `Date,Timestamp,Open,High,Low,Close[,Volume]` with
//! `Date` as `YYYYMMDD` or `YYYY-MM-DD` and `Timestamp` as `H:MM:SS`. The
//! volume column is ignored when present. The engine itself never opens
//! files; everything entering it goes through the validating `BarSeries`
//! constructor here.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

use edgelab_core::domain::{Bar, BarSeries, SeriesError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("{path} line {line}: invalid timestamp '{value}'")]
    Timestamp {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error("{path}: {source}")]
    Series {
        path: PathBuf,
        source: SeriesError,
    },
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume", default)]
    #[allow(dead_code)]
    volume: Option<f64>,
}

/// Rewrite a compact `YYYYMMDD` date into dashed form; anything else passes
/// through untouched and is judged by the timestamp parse.
fn normalize_date(date: &str) -> String {
    if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &date[0..4], &date[4..6], &date[6..8])
    } else {
        date.to_string()
    }
}

/// Load and validate a bar series from a CSV file.
pub fn load_bars(path: &Path) -> Result<BarSeries, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut bars = Vec::new();
    for (index, row) in reader.deserialize::<RawRow>().enumerate() {
        let line = index as u64 + 2; // header is line 1
        let row = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let stamp = format!("{} {}", normalize_date(row.date.trim()), row.timestamp.trim());
        let timestamp = NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S").map_err(|_| {
            LoadError::Timestamp {
                path: path.to_path_buf(),
                line,
                value: stamp.clone(),
            }
        })?;

        bars.push(Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        });
    }

    BarSeries::new(bars).map_err(|source| LoadError::Series {
        path: path.to_path_buf(),
        source,
    })
}
