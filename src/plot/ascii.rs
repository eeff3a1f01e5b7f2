//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed rates: one symbol per series (`o`, `x`, `+`, ...)
//! - connecting lines within a series: `.`
//! - forecast points: `*`

use chrono::NaiveDate;

use crate::domain::ForecastResult;

const SERIES_SYMBOLS: [char; 10] = ['o', 'x', '+', '#', '@', '%', '&', '=', '~', '$'];
const FORECAST_SYMBOL: char = '*';

/// Render rate-over-time series (e.g. one per area) with an optional forecast.
pub fn render_rate_chart(
    series: &[(String, Vec<(NaiveDate, f64)>)],
    forecast: Option<&ForecastResult>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let forecast_points: Vec<(NaiveDate, f64)> = forecast
        .map(|f| f.points.iter().map(|p| (p.date, p.predicted_rate)).collect())
        .unwrap_or_default();

    let all_points = || {
        series
            .iter()
            .flat_map(|(_, pts)| pts.iter().copied())
            .chain(forecast_points.iter().copied())
    };

    let Some(origin) = all_points().map(|(d, _)| d).min() else {
        return "Plot: no data\n".to_string();
    };
    let last = all_points().map(|(d, _)| d).max().unwrap_or(origin);
    let day = |d: NaiveDate| (d - origin).num_days() as f64;

    let (t_min, t_max) = widen(0.0, day(last), 1.0);
    let (y_min, y_max) = y_range(all_points().map(|(_, y)| y)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so point symbols overlay them.
    for (_, pts) in series {
        let mut prev = None;
        for &(d, y) in pts {
            let x = map_x(day(d), t_min, t_max, width);
            let yy = map_y(y, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, yy, '.');
            }
            prev = Some((x, yy));
        }
    }
    for (i, (_, pts)) in series.iter().enumerate() {
        let symbol = SERIES_SYMBOLS[i % SERIES_SYMBOLS.len()];
        for &(d, y) in pts {
            grid[map_y(y, y_min, y_max, height)][map_x(day(d), t_min, t_max, width)] = symbol;
        }
    }
    for &(d, y) in &forecast_points {
        grid[map_y(y, y_min, y_max, height)][map_x(day(d), t_min, t_max, width)] = FORECAST_SYMBOL;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{origin}, {last}] | rate=[{y_min:.2}, {y_max:.2}]%\n"
    ));
    if series.len() > 1 || !forecast_points.is_empty() {
        let mut legend: Vec<String> = series
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{}={name}", SERIES_SYMBOLS[i % SERIES_SYMBOLS.len()]))
            .collect();
        if !forecast_points.is_empty() {
            legend.push(format!("{FORECAST_SYMBOL}=forecast"));
        }
        out.push_str(&format!("Legend: {}\n", legend.join("  ")));
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for y in values {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    Some(widen(min_y, max_y, 0.5))
}

/// Give a degenerate range some width so the mapping stays defined.
fn widen(min: f64, max: f64, by: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - by, max + by) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only writes into empty cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
