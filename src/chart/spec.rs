use super::palette::{PaletteChoice, Rgb};
use crate::data::model::SalaryRecord;
use crate::data::simulate::{BoxStats, SimulatedSeries};

pub const BAR_TITLE: &str = "Average Salary by Department";
pub const VIOLIN_TITLE: &str = "Simulated distributions (illustrative)";
pub const SALARY_AXIS: &str = "Salary (USD)";

/// Pixels per department row.
pub const ROW_HEIGHT: u32 = 60;
/// Charts never get shorter than this many rows.
pub const MIN_ROWS: usize = 4;

/// Figure height for `rows` departments.
pub fn chart_height(rows: usize) -> u32 {
    ROW_HEIGHT * rows.max(MIN_ROWS) as u32
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

/// One horizontal bar: the department average with its min/max range.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub department: String,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub error_minus: f64,
    pub error_plus: f64,
    pub color: Rgb,
}

/// Everything a backend needs to draw the bar chart. Bars are listed top to
/// bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartSpec {
    pub title: String,
    pub x_title: String,
    pub bars: Vec<BarSpec>,
    pub show_error_bars: bool,
    pub height: u32,
}

impl BarChartSpec {
    pub fn build(records: &[SalaryRecord], palette: PaletteChoice, show_error_bars: bool) -> Self {
        let colors = palette.colors(records.len());
        let bars = records
            .iter()
            .zip(colors)
            .map(|(r, color)| BarSpec {
                department: r.department.clone(),
                average: r.average,
                min: r.min,
                max: r.max,
                error_minus: r.error_minus(),
                error_plus: r.error_plus(),
                color,
            })
            .collect();

        Self {
            title: BAR_TITLE.to_string(),
            x_title: SALARY_AXIS.to_string(),
            bars,
            show_error_bars,
            height: chart_height(records.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Violin chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ViolinSpec {
    pub department: String,
    pub color: Rgb,
    pub samples: Vec<f64>,
    pub stats: BoxStats,
    pub density: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViolinChartSpec {
    pub title: String,
    pub x_title: String,
    pub series: Vec<ViolinSpec>,
    pub height: u32,
}

impl ViolinChartSpec {
    /// `rows` is the number of departments in the view, which sets the
    /// height so both charts line up.
    pub fn build(series: Vec<SimulatedSeries>, palette: PaletteChoice, rows: usize) -> Self {
        let colors = palette.colors(series.len());
        let series = series
            .into_iter()
            .zip(colors)
            .map(|(s, color)| ViolinSpec {
                department: s.department,
                color,
                samples: s.samples,
                stats: s.stats,
                density: s.density,
            })
            .collect();

        Self {
            title: VIOLIN_TITLE.to_string(),
            x_title: SALARY_AXIS.to_string(),
            series,
            height: chart_height(rows),
        }
    }
}
