//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical row and column model (`Observation`, `Column`)
//! - selection criteria (`FilterSpec`, `GroupBy`)
//! - outputs (`Summary`, `TrendModel`, `ForecastResult`, `ForecastOutcome`)
//! - the resolved run configuration (`RunConfig`)

pub mod types;

pub use types::*;
