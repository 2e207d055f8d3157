//! ASCII plotting of actual vs predicted sales for terminal output.
//!
//! Fixed-size character grid, deterministic output (golden-tested).
//!
//! Plot elements:
//! - actual sales: `-` line
//! - predicted sales: `o` per point, joined by `.`

use chrono::Datelike;

use crate::domain::ForecastRow;

/// Render a comparison (rows must be ascending by date).
pub fn render_comparison_plot(rows: &[ForecastRow], width: usize, height: usize) -> String {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return "Plot: (no data)\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);

    let actual: Vec<(f64, f64)> = rows.iter().map(|r| (x_of(r), r.actual_sales)).collect();
    let predicted: Vec<(f64, f64)> = rows.iter().map(|r| (x_of(r), r.predicted_sales)).collect();

    let (x_min, x_max) = widen(x_of(first), x_of(last));
    let (y_min, y_max) = y_range(&actual, &predicted).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let to_cell = |(x, y): (f64, f64)| (map_x(x, x_min, x_max, width), map_y(y, y_min, y_max, height));

    draw_polyline(&mut grid, actual.iter().copied().map(to_cell), '-');
    draw_polyline(&mut grid, predicted.iter().copied().map(to_cell), '.');
    for &p in &predicted {
        let (x, y) = to_cell(p);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | sales=[{y_min:.2}, {y_max:.2}] | - actual, o predicted\n",
        first.date, last.date
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_of(r: &ForecastRow) -> f64 {
    r.date.num_days_from_ce() as f64
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 1.0, max + 1.0) }
}

fn y_range(a: &[(f64, f64)], b: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in a.iter().chain(b) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() {
        Some(widen(min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], cells: impl Iterator<Item = (usize, usize)>, ch: char) {
    let mut prev: Option<(usize, usize)> = None;
    for (x, y) in cells {
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, ch),
            None => draw_line(grid, x, y, x, y, ch),
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham). Only blank cells are written, so the
/// first series drawn wins overlaps.
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn plot_golden_snapshot_small() {
        let rows = vec![
            ForecastRow {
                date: NaiveDate::from_ymd_opt(2017, 1, 2).unwrap(),
                predicted_sales: 105.0,
                actual_sales: 100.0,
            },
            ForecastRow {
                date: NaiveDate::from_ymd_opt(2017, 1, 3).unwrap(),
                predicted_sales: 105.0,
                actual_sales: 110.0,
            },
        ];

        let txt = render_comparison_plot(&rows, 10, 5);
        let expected = concat!(
            "Plot: 2017-01-02 .. 2017-01-03 | sales=[99.50, 110.50] | - actual, o predicted\n",
            "        --\n",
            "      --  \n",
            "o...--...o\n",
            "  --      \n",
            "--        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_and_single_point_plots() {
        assert_eq!(render_comparison_plot(&[], 10, 5), "Plot: (no data)\n");

        let one = [ForecastRow {
            date: NaiveDate::from_ymd_opt(2017, 1, 2).unwrap(),
            predicted_sales: 5.0,
            actual_sales: 5.0,
        }];
        let txt = render_comparison_plot(&one, 10, 5);
        assert_eq!(txt.lines().count(), 6);
        let markers: usize = txt.lines().skip(1).map(|l| l.matches('o').count()).sum();
        assert_eq!(markers, 1);
    }
}
