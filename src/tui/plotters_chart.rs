//! Plotters-powered sales trend widget for Ratatui.
//!
//! Plotters gives nicer line rendering than Ratatui's built-in `Chart` at
//! terminal resolution. Output goes into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call so `render()`
/// only draws.
pub struct TrendChart<'a> {
    /// Daily sales totals as (days since first sale, sales).
    pub line: &'a [(f64, f64)],
    /// Individual line items as (days since first sale, sales).
    pub points: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl TrendChart<'_> {
    /// Chart bounds covering both series with a little vertical headroom.
    ///
    /// `None` when there is nothing to draw.
    pub fn bounds(line: &[(f64, f64)], points: &[(f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
        let all = || line.iter().chain(points.iter());
        let x_min = all().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let x_max = all().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let y_max = all().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        if !(x_min.is_finite() && x_max.is_finite() && y_max.is_finite()) {
            return None;
        }
        // A single day still needs a non-empty x range.
        let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };
        let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };
        Some(([x_min, x_max], [0.0, y_max]))
    }
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters can fail to lay out a chart in a tiny area.
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
                // Tick labels are drawn by the caller in terminal cells.
                .set_label_area_size(LabelAreaPosition::Left, 0)
                .set_label_area_size(LabelAreaPosition::Bottom, 0)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .axis_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            let item_color = RGBColor(255, 215, 0); // gold

            chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;

            // `Circle` radii come out far too large through this backend; a
            // pixel reads as a clean dot.
            chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), item_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_both_series() {
        let line = [(0.0, 10.0), (4.0, 20.0)];
        let points = [(0.0, 4.0), (5.0, 6.0)];
        let (x, y) = TrendChart::bounds(&line, &points).unwrap();
        assert_eq!(x, [0.0, 5.0]);
        assert_eq!(y[0], 0.0);
        assert!((y[1] - 21.0).abs() < 1e-9);
    }

    #[test]
    fn single_day_and_empty_series() {
        assert!(TrendChart::bounds(&[], &[]).is_none());
        let (x, _) = TrendChart::bounds(&[(3.0, 2.0)], &[]).unwrap();
        assert_eq!(x, [3.0, 4.0]);
    }
}
