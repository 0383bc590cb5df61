//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Two chart shapes cover every view:
//! - horizontal bars (`#`) for keyed tables
//! - a dated trend line (`-`) with observations (`o`) for drilldowns

use chrono::NaiveDate;

use crate::report::format::truncate;

/// Longest label kept in the bar chart's label column.
const MAX_LABEL: usize = 24;

/// Render `rows` as horizontal bars scaled to the largest value.
///
/// `width` is the length of the longest bar. Negative values draw no bar.
pub fn render_bar_chart<F>(rows: &[(String, f64)], width: usize, fmt_value: F) -> String
where
    F: Fn(f64) -> String,
{
    if rows.is_empty() {
        return "No data to plot.\n".to_string();
    }
    let width = width.max(10);
    let label_w = rows
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL);
    let max = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, value) in rows {
        let len = if max > 0.0 {
            ((value.max(0.0) / max) * width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<label_w$} |{} {}\n",
            truncate(label, label_w),
            "#".repeat(len),
            fmt_value(*value)
        ));
    }
    out
}

/// Render a dated series as a line chart.
///
/// Same-date points should already be merged (see `drilldown::daily_totals`).
pub fn render_trend(points: &[(NaiveDate, f64)], width: usize, height: usize) -> String {
    let Some(&(first, _)) = points.first() else {
        return "No data to plot.\n".to_string();
    };
    let width = width.max(10);
    let height = height.max(5);

    let xs: Vec<f64> = points
        .iter()
        .map(|(d, _)| (*d - first).num_days() as f64)
        .collect();
    let (t_min, t_max) = span(&xs).unwrap_or((0.0, 1.0));
    let ys: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
    let (y_min, y_max) = span(&ys).unwrap_or_else(|| (ys[0] - 1.0, ys[0] + 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let cells: Vec<(usize, usize)> = xs
        .iter()
        .zip(&ys)
        .map(|(&t, &y)| (map_x(t, t_min, t_max, width), map_y(y, y_min, y_max, height)))
        .collect();

    // Line first so observations overlay it.
    for w in cells.windows(2) {
        draw_line(&mut grid, w[0], w[1], '-');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }

    let last = points[points.len() - 1].0;
    let mut out = format!("Trend: {first} .. {last} | sales=[{y_min:.2}, {y_max:.2}]\n");
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn span(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top (largest value).
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish); only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            if *cell == ' ' {
                *cell = ch;
            }
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
