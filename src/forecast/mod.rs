//! Short-horizon forecasting of the unemployment rate.
//!
//! Responsibilities:
//!
//! - select the valid `(date, rate)` history
//! - fit a least-squares trend on day offsets
//! - extrapolate over calendar months

pub mod trend;

pub use trend::*;
