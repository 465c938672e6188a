//! Artifact export: trade ledger CSV and equity JSON.
//!
//! Pure consumers of the engine output; the engine itself never writes
//! files. The CSV carries a running `balance` column so the equity curve of
//! closed trades can be plotted straight from the artifact.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use edgelab_core::domain::Ledger;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    entry_time: String,
    exit_time: String,
    side: &'a str,
    entry_price: f64,
    exit_price: f64,
    pnl: f64,
    balance: f64,
}

/// Write the ledger as CSV with a running balance column.
pub fn write_trades_csv(
    path: &Path,
    ledger: &Ledger,
    initial_balance: f64,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let balances = ledger.running_balances(initial_balance);
    for (trade, balance) in ledger.trades().iter().zip(balances) {
        let row = TradeRow {
            entry_time: trade.entry_time.format(TIME_FORMAT).to_string(),
            exit_time: trade.exit_time.format(TIME_FORMAT).to_string(),
            side: match trade.side {
                edgelab_core::domain::Side::Long => "long",
                edgelab_core::domain::Side::Short => "short",
            },
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            pnl: trade.pnl,
            balance,
        };
        writer.serialize(row).map_err(|source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    }

    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Serialize)]
struct EquityPoint {
    time: String,
    balance: f64,
}

/// Write the per-trade balance series as a JSON array of {time, balance}.
pub fn write_equity_json(
    path: &Path,
    ledger: &Ledger,
    initial_balance: f64,
) -> Result<(), ExportError> {
    let balances = ledger.running_balances(initial_balance);
    let points: Vec<EquityPoint> = ledger
        .trades()
        .iter()
        .zip(balances)
        .map(|(trade, balance)| EquityPoint {
            time: trade.exit_time.format(TIME_FORMAT).to_string(),
            balance,
        })
        .collect();

    let json = serde_json::to_string_pretty(&points).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
