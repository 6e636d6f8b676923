use std::ops::RangeInclusive;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridInput, GridMark, Line, Plot, PlotPoints,
    Polygon,
};

use super::theme::color32;
use crate::chart::layout::{self, BAR_FILL};
use crate::chart::spec::{BarChartSpec, ViolinChartSpec};
use crate::format;

/// Half the height of a violin, in row units.
const VIOLIN_HALF_WIDTH: f64 = 0.4;
/// Height of the whisker caps, in row units.
const CAP: f64 = 0.12;

// ---------------------------------------------------------------------------
// Category axis helpers
// ---------------------------------------------------------------------------

/// Plot y of row `index` so the first row is drawn on top.
fn row_y(index: usize, rows: usize) -> f64 {
    (rows - 1 - index) as f64
}

/// Grid spacer with one mark per visible category row, never past the last
/// of `rows`.
fn row_marks(rows: usize) -> impl Fn(GridInput) -> Vec<GridMark> {
    move |input| {
        if rows == 0 {
            return Vec::new();
        }
        let (lo, hi) = input.bounds;
        let first = lo.ceil().max(0.0) as i64;
        let last = (hi.floor() as i64).min(rows as i64 - 1);
        (first..=last)
            .map(|v| GridMark {
                value: v as f64,
                step_size: 1.0,
            })
            .collect()
    }
}

/// Axis formatter that prints the department name at each row mark.
fn row_labels(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let rows = labels.len();
        let v = mark.value.round();
        if (mark.value - v).abs() > 1e-6 || v < 0.0 || v as usize >= rows {
            return String::new();
        }
        labels[rows - 1 - v as usize].clone()
    }
}

// ---------------------------------------------------------------------------
// Average salary bar chart
// ---------------------------------------------------------------------------

/// Render the bar chart spec with `egui_plot`.
pub fn bar_chart(ui: &mut Ui, spec: &BarChartSpec) {
    let rows = spec.bars.len();
    let (lo, hi) = match layout::bar_value_range(spec) {
        Ok(range) => range,
        Err(e) => {
            ui.colored_label(Color32::RED, format!("Cannot draw chart: {e}"));
            return;
        }
    };

    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .enumerate()
        .filter_map(|(i, b)| {
            let avg = b.average?;
            Some(
                Bar::new(row_y(i, rows), avg)
                    .name(&b.department)
                    .fill(color32(b.color))
                    .width(BAR_FILL as f64),
            )
        })
        .collect();

    let ranges: Vec<(Option<f64>, Option<f64>)> = spec.bars.iter().map(|b| (b.min, b.max)).collect();
    let chart = BarChart::new(bars)
        .horizontal()
        .name("Average")
        .element_formatter(Box::new(move |bar: &Bar, _chart: &BarChart| {
            let index = rows.saturating_sub(1 + bar.argument.round() as usize);
            let (min, max) = ranges.get(index).copied().unwrap_or((None, None));
            format!(
                "{}\nAverage: {}\nMin: {}\nMax: {}",
                bar.name,
                format::currency(bar.value),
                format::currency_or_na(min),
                format::currency_or_na(max),
            )
        }));

    let whisker_color = if ui.visuals().dark_mode {
        Color32::from_white_alpha(180)
    } else {
        Color32::from_black_alpha(180)
    };
    let whiskers: Vec<Line> = if spec.show_error_bars {
        spec.bars
            .iter()
            .enumerate()
            .filter_map(|(i, b)| {
                let avg = b.average?;
                let y = row_y(i, rows);
                let (left, right) = (avg - b.error_minus, avg + b.error_plus);
                Some([
                    vec![[left, y], [right, y]],
                    vec![[left, y - CAP], [left, y + CAP]],
                    vec![[right, y - CAP], [right, y + CAP]],
                ])
            })
            .flatten()
            .map(|points| Line::new(PlotPoints::new(points)).color(whisker_color).width(1.5))
            .collect()
    } else {
        Vec::new()
    };

    let labels = spec.bars.iter().map(|b| b.department.clone()).collect();
    Plot::new("salary_bar_chart")
        .height(spec.height as f32)
        .x_axis_label(&spec.x_title)
        .x_axis_formatter(|mark, _range| format::thousands(mark.value, 0))
        .y_axis_formatter(row_labels(labels))
        .y_grid_spacer(row_marks(rows))
        .y_axis_min_width(160.0)
        .include_y(-0.5)
        .include_y(rows.max(1) as f64 - 0.5)
        .include_x(lo)
        .include_x(hi)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            for line in whiskers {
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Simulated violins
// ---------------------------------------------------------------------------

/// Render box plots plus density outlines for each simulated department.
pub fn violin_chart(ui: &mut Ui, spec: &ViolinChartSpec) {
    let rows = spec.series.len();
    let (lo, hi) = match layout::violin_value_range(spec) {
        Ok(range) => range,
        Err(e) => {
            ui.colored_label(Color32::RED, format!("Cannot draw chart: {e}"));
            return;
        }
    };

    let boxes: Vec<BoxElem> = spec
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let c = color32(s.color);
            let st = s.stats;
            BoxElem::new(
                row_y(i, rows),
                BoxSpread::new(st.lower_whisker, st.q1, st.median, st.q3, st.upper_whisker),
            )
            .name(&s.department)
            .fill(c.linear_multiply(0.5))
            .stroke(Stroke::new(1.0, c))
            .box_width(0.15)
            .whisker_width(0.0)
        })
        .collect();

    let outlines: Vec<Polygon> = spec
        .series
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.density.is_empty())
        .map(|(i, s)| {
            let y = row_y(i, rows);
            let peak = s
                .density
                .iter()
                .map(|[_, d]| *d)
                .fold(f64::MIN_POSITIVE, f64::max);
            let scale = VIOLIN_HALF_WIDTH / peak;
            let upper = s.density.iter().map(|[x, d]| [*x, y + d * scale]);
            let lower = s.density.iter().rev().map(|[x, d]| [*x, y - d * scale]);
            let c = color32(s.color);
            Polygon::new(PlotPoints::new(upper.chain(lower).collect()))
                .name(&s.department)
                .fill_color(c.linear_multiply(0.2))
                .stroke(Stroke::new(1.0, c))
        })
        .collect();

    let labels = spec.series.iter().map(|s| s.department.clone()).collect();
    Plot::new("salary_violin_chart")
        .height(spec.height as f32)
        .x_axis_label(&spec.x_title)
        .x_axis_formatter(|mark, _range| format::thousands(mark.value, 0))
        .y_axis_formatter(row_labels(labels))
        .y_grid_spacer(row_marks(rows))
        .y_axis_min_width(160.0)
        .include_y(-0.5)
        .include_y(rows.max(1) as f64 - 0.5)
        .include_x(lo)
        .include_x(hi)
        .show(ui, |plot_ui| {
            for outline in outlines {
                plot_ui.polygon(outline);
            }
            plot_ui.box_plot(BoxPlot::new(boxes).horizontal().name("Quartiles"));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_row_is_on_top() {
        assert_eq!(row_y(0, 3), 2.0);
        assert_eq!(row_y(2, 3), 0.0);
    }

    #[test]
    fn labels_only_on_whole_rows() {
        let fmt = row_labels(vec!["IT".into(), "HR".into()]);
        let mark = |value| GridMark {
            value,
            step_size: 1.0,
        };
        assert_eq!(fmt(mark(1.0), &(0.0..=1.0)), "IT");
        assert_eq!(fmt(mark(0.0), &(0.0..=1.0)), "HR");
        assert_eq!(fmt(mark(0.5), &(0.0..=1.0)), "");
        assert_eq!(fmt(mark(2.0), &(0.0..=1.0)), "");
    }

    #[test]
    fn zoomed_out_grid_stops_at_the_rows() {
        let spacer = row_marks(9);
        let marks = spacer(GridInput {
            bounds: (-1e7, 1e7),
            base_step_size: 1.0,
        });
        assert_eq!(marks.len(), 9);
        assert_eq!(marks[8].value, 8.0);

        let marks = spacer(GridInput {
            bounds: (2.5, 4.2),
            base_step_size: 1.0,
        });
        let values: Vec<f64> = marks.iter().map(|m| m.value).collect();
        assert_eq!(values, [3.0, 4.0]);

        assert!(row_marks(0)(GridInput { bounds: (0.0, 5.0), base_step_size: 1.0 }).is_empty());
    }
}
