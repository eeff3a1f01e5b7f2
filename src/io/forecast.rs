//! Forecast JSON export.
//!
//! Forecast JSON is the portable record of a run's trend: the fitted model
//! (slope, intercept, time origin), how many points it was fit on, and the
//! predicted rows.

use std::fs::File;
use std::path::Path;

use crate::domain::ForecastResult;
use crate::error::AppError;

pub fn write_forecast_json(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;
    Ok(())
}
