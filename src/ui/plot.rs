use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::ColorMap;
use crate::data::aggregate::{ScatterPoint, SummaryTable, TimeSeries};
use crate::ui::format_currency;

// ---------------------------------------------------------------------------
// Bar chart – one bar per group
// ---------------------------------------------------------------------------

pub fn bar_chart(ui: &mut Ui, id: &str, table: &SummaryTable, colors: &ColorMap) {
    Plot::new(id)
        .legend(Legend::default())
        .height(400.0)
        .y_axis_label(table.value_column.column_name())
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, row) in table.rows.iter().enumerate() {
                let label = row.label();
                let bar = Bar::new(i as f64, row.value)
                    .width(0.6)
                    .name(format!("{label}: {}", format_currency(row.value)))
                    .fill(colors.color_for(&label));
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(&label)
                        .color(colors.color_for(&label)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie / donut – share of each group
// ---------------------------------------------------------------------------

/// Angular extent of each slice, starting at twelve o'clock and running
/// clockwise. Non-positive values get no slice.
pub fn pie_slices(values: &[f64]) -> Vec<(f64, f64)> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let mut start = TAU / 4.0;
    values
        .iter()
        .map(|v| {
            let sweep = if total > 0.0 && *v > 0.0 { v / total * TAU } else { 0.0 };
            let slice = (start, start - sweep);
            start -= sweep;
            slice
        })
        .collect()
}

/// Render a pie; `hole` is the inner radius as a fraction of the outer (0 = full pie).
pub fn pie_chart(ui: &mut Ui, id: &str, table: &SummaryTable, colors: &ColorMap, hole: f64) {
    let values: Vec<f64> = table.rows.iter().map(|r| r.value).collect();
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let slices = pie_slices(&values);

    Plot::new(id)
        .legend(Legend::default())
        .height(400.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (row, (from, to)) in table.rows.iter().zip(slices) {
                if from == to {
                    continue;
                }
                let label = row.label();
                let share = if total > 0.0 { row.value / total * 100.0 } else { 0.0 };
                let name = format!("{label} ({share:.1}%)");
                let color = colors.color_for(&label);

                // Short convex segments so the fill stays correct for wide slices.
                let steps = (((from - to) / TAU) * 96.0).ceil().max(1.0) as usize;
                for s in 0..steps {
                    let a0 = from + (to - from) * s as f64 / steps as f64;
                    let a1 = from + (to - from) * (s + 1) as f64 / steps as f64;
                    let pts = vec![
                        [a0.cos(), a0.sin()],
                        [a1.cos(), a1.sin()],
                        [hole * a1.cos(), hole * a1.sin()],
                        [hole * a0.cos(), hole * a0.sin()],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(pts))
                            .fill_color(color)
                            .stroke((0.0, color))
                            .name(&name),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Line chart – monthly time series
// ---------------------------------------------------------------------------

pub fn time_series_chart(ui: &mut Ui, series: &TimeSeries) {
    let labels: Vec<String> = series.buckets.iter().map(|b| b.label()).collect();
    let points: Vec<[f64; 2]> = series
        .buckets
        .iter()
        .enumerate()
        .map(|(i, b)| [i as f64, b.value])
        .collect();

    Plot::new("time_series")
        .height(500.0)
        .y_axis_label("Amount")
        .x_axis_label("month_year")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::new(points.clone()))
                    .name(series.value_column.column_name())
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(points))
                    .radius(3.0)
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

// ---------------------------------------------------------------------------
// Scatter – sales vs profit, marker size by quantity
// ---------------------------------------------------------------------------

pub fn scatter_chart(ui: &mut Ui, points: &[ScatterPoint]) {
    let mut by_quantity: BTreeMap<i64, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        by_quantity.entry(p.quantity).or_default().push([p.sales, p.profit]);
    }

    Plot::new("sales_vs_profit")
        .legend(Legend::default())
        .height(450.0)
        .x_axis_label("Sales")
        .y_axis_label("Profit")
        .show(ui, |plot_ui| {
            for (quantity, pts) in by_quantity {
                let radius = 1.5 + (quantity.max(1) as f32).sqrt() * 1.5;
                plot_ui.points(
                    Points::new(PlotPoints::new(pts))
                        .radius(radius)
                        .color(Color32::from_rgba_unmultiplied(99, 110, 250, 160))
                        .name(format!("Quantity {quantity}")),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_cover_full_circle() {
        let slices = pie_slices(&[1.0, 1.0, 2.0]);
        let sweep: f64 = slices.iter().map(|(a, b)| a - b).sum();
        assert!((sweep - TAU).abs() < 1e-9);
        assert!((slices[2].0 - slices[2].1 - TAU / 2.0).abs() < 1e-9);
        assert_eq!(slices[0].1, slices[1].0);
    }

    #[test]
    fn non_positive_values_get_no_slice() {
        let slices = pie_slices(&[3.0, -2.0, 0.0]);
        assert_eq!(slices[1].0, slices[1].1);
        assert_eq!(slices[2].0, slices[2].1);
        assert!((slices[0].0 - slices[0].1 - TAU).abs() < 1e-9);
    }
}
