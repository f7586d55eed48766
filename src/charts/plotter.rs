//! Chart Plotter Module
//! Interactive stacked histograms using egui_plot.

use crate::stats::GroupedCounts;
use egui::Color32;
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot};

/// Series palette, shared with the static renderer.
pub const PALETTE: [(u8, u8, u8); 10] = [
    (52, 152, 219),  // Blue
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (121, 85, 72),   // Brown
    (96, 125, 139),  // Blue Grey
];

const CHART_HEIGHT: f32 = 300.0;
const BAR_WIDTH: f64 = 0.7;

/// Label used for records with an empty sector.
pub const EMPTY_SERIES_LABEL: &str = "(sem setor)";

pub fn series_label(series: &str) -> &str {
    if series.is_empty() {
        EMPTY_SERIES_LABEL
    } else {
        series
    }
}

/// Draws grouped counts as stacked bar charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the n-th series.
    pub fn series_color(index: usize) -> Color32 {
        let (r, g, b) = PALETTE[index % PALETTE.len()];
        Color32::from_rgb(r, g, b)
    }

    /// One bar per category, stacked by series. X-axis: categories, Y-axis: absences.
    pub fn draw_stacked_histogram(ui: &mut egui::Ui, id: &str, counts: &GroupedCounts) {
        let labels = counts.categories.clone();
        let n_categories = labels.len();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label("Faltas")
            .x_grid_spacer(move |_input| {
                (0..n_categories)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let mut charts: Vec<BarChart> = Vec::with_capacity(counts.series.len());

                for (series_idx, series) in counts.series.iter().enumerate() {
                    let name = series_label(series);
                    let bars: Vec<Bar> = counts
                        .categories
                        .iter()
                        .enumerate()
                        .map(|(i, category)| {
                            Bar::new(i as f64, counts.count(category, series) as f64)
                                .name(format!("{} - {}", category, name))
                        })
                        .collect();

                    let below: Vec<&BarChart> = charts.iter().collect();
                    let chart = BarChart::new(bars)
                        .width(BAR_WIDTH)
                        .color(Self::series_color(series_idx))
                        .name(name)
                        .stack_on(&below);
                    charts.push(chart);
                }

                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }
}
