//! Indicator computations over bar series.

pub mod sma;

pub use sma::rolling_close_sma;
