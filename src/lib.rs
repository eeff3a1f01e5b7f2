//! `labour-trends` library crate.
//!
//! The binary (`lt`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the normalization/forecast core is reusable by other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod schema;
pub mod tui;
