//! Plotters-powered rate chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`, which gives us axis and tick handling for free.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// High-contrast palette for terminal rendering, cycled per series.
const PALETTE: [RGBColor; 6] = [
    RGBColor(0, 255, 255),
    RGBColor(0, 255, 0),
    RGBColor(255, 0, 255),
    RGBColor(255, 255, 255),
    RGBColor(255, 128, 0),
    RGBColor(128, 128, 255),
];

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call; x values are
/// day offsets from `x_origin`.
pub struct RatesChart<'a> {
    /// One line per group (region or area).
    pub series: &'a [Vec<(f64, f64)>],
    /// Forecast points, drawn as a separate line.
    pub forecast: &'a [(f64, f64)],
    pub x_origin: NaiveDate,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for RatesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let origin = self.x_origin;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc("rate (%)")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_day_offset(origin, *v))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for (i, line) in self.series.iter().enumerate() {
                let color = PALETTE[i % PALETTE.len()];
                chart.draw_series(LineSeries::new(line.iter().copied(), &color))?;
            }

            // Pixels rather than `Circle`: the backend maps circle radii badly.
            let forecast_color = RGBColor(255, 255, 0);
            chart.draw_series(LineSeries::new(self.forecast.iter().copied(), &forecast_color))?;
            chart.draw_series(
                self.forecast
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), forecast_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn fmt_day_offset(origin: NaiveDate, days: f64) -> String {
    let date = origin + Duration::days(days.round() as i64);
    date.format("%Y-%m").to_string()
}
