//! Linear trend over time, extrapolated by calendar month.
//!
//! The independent variable is the number of days since the earliest date in
//! the series; the fit is a single ordinary least-squares pass. Forecast dates
//! are `last + k months` for `k = 1..=horizon`, each computed from the last
//! observed date (month ends clamp, e.g. Jan 31 + 1 month = Feb 28/29).

use chrono::{Months, NaiveDate};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::domain::{ForecastOutcome, ForecastPoint, ForecastResult, MIN_FORECAST_POINTS, TrendModel};
use crate::error::ForecastError;
use crate::math::fit_line;

/// Fit a trend to `(date, rate)` pairs.
///
/// Returns `Ok(None)` when there are fewer than [`MIN_FORECAST_POINTS`] pairs.
pub fn fit_trend(series: &[(NaiveDate, f64)]) -> Result<Option<TrendModel>, ForecastError> {
    if series.len() < MIN_FORECAST_POINTS {
        return Ok(None);
    }
    let Some(time_origin) = series.iter().map(|(d, _)| *d).min() else {
        return Ok(None);
    };

    let xs: Vec<f64> = series
        .iter()
        .map(|(d, _)| (*d - time_origin).num_days() as f64)
        .collect();
    let ys: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

    let (intercept, slope) =
        fit_line(&xs, &ys).ok_or(ForecastError::Solver { points: series.len() })?;

    Ok(Some(TrendModel {
        slope,
        intercept,
        time_origin,
    }))
}

/// Fit a trend over the whole dataset and forecast `horizon_months` monthly steps.
///
/// Always pass the unfiltered dataset: the forecast is meant to use the full
/// history regardless of what the caller is currently displaying.
pub fn fit_and_forecast(dataset: &Dataset, horizon_months: u32) -> Result<ForecastOutcome, ForecastError> {
    let series = dataset.rate_series();

    let Some(model) = fit_trend(&series)? else {
        info!(
            valid_points = series.len(),
            required = MIN_FORECAST_POINTS,
            "not enough data to forecast"
        );
        return Ok(ForecastOutcome::InsufficientData {
            valid_points: series.len(),
            required: MIN_FORECAST_POINTS,
        });
    };

    let last_observed = series
        .iter()
        .map(|(d, _)| *d)
        .max()
        .unwrap_or(model.time_origin);

    let points = forecast_dates(last_observed, horizon_months)?
        .into_iter()
        .map(|date| ForecastPoint {
            date,
            predicted_rate: model.predict(date),
        })
        .collect();

    debug!(
        slope = model.slope,
        intercept = model.intercept,
        origin = %model.time_origin,
        "fitted trend"
    );

    Ok(ForecastOutcome::Forecast(ForecastResult {
        model,
        n_points: series.len(),
        last_observed,
        points,
    }))
}

/// `last + 1 month, ..., last + horizon months`.
pub fn forecast_dates(last: NaiveDate, horizon_months: u32) -> Result<Vec<NaiveDate>, ForecastError> {
    (1..=horizon_months)
        .map(|k| {
            last.checked_add_months(Months::new(k))
                .ok_or(ForecastError::DateOutOfRange { from: last, months: k })
        })
        .collect()
}
