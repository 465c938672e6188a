//! Domain types for the backtest engine.

pub mod account;
pub mod bar;
pub mod position;
pub mod series;
pub mod side;
pub mod trade;

pub use account::AccountState;
pub use bar::Bar;
pub use position::Position;
pub use series::{BarSeries, SeriesError, TimeFrame};
pub use side::Side;
pub use trade::{round_currency, round_price, Ledger, Trade};
