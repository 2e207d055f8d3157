//! Plotters-powered actual-vs-predicted chart widget for Ratatui.
//!
//! Rendering goes through `plotters-ratatui-backend`, which maps Plotters
//! primitives onto Ratatui's `Canvas`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description. Series and bounds are computed by the caller.
///
/// The x axis is days since the common era (`NaiveDate::num_days_from_ce`).
pub struct SalesChart<'a> {
    /// Tail of the training series, drawn for context.
    pub history: &'a [(f64, f64)],
    /// Test-partition actual sales.
    pub actual: &'a [(f64, f64)],
    /// Predicted sales for the same dates.
    pub predicted: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: String,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl Widget for SalesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a tiny area.
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
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let history_color = RGBColor(128, 128, 128);
            let actual_color = WHITE;
            let predicted_color = RGBColor(0, 255, 255); // cyan

            chart.draw_series(LineSeries::new(self.history.iter().copied(), &history_color))?;
            chart.draw_series(LineSeries::new(self.actual.iter().copied(), &actual_color))?;
            chart.draw_series(LineSeries::new(self.predicted.iter().copied(), &predicted_color))?;

            // `Circle` radii are mis-scaled by the backend; pixels mark the points.
            chart.draw_series(
                self.predicted
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), predicted_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
