use super::spec::{BarChartSpec, ViolinChartSpec};
use crate::error::RenderError;

/// Raster export width in logical pixels (before the 2x scale).
pub const EXPORT_WIDTH: u32 = 900;
/// Share of each row the bar occupies.
pub const BAR_FILL: f32 = 0.8;
/// Headroom added past the data extent.
const PAD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Room for department labels on the left and the title on top.
pub const BAR_MARGINS: Margins = Margins {
    left: 220.0,
    right: 40.0,
    top: 80.0,
    bottom: 40.0,
};

pub const VIOLIN_MARGINS: Margins = Margins {
    left: 220.0,
    right: 40.0,
    top: 40.0,
    bottom: 40.0,
};

// ---------------------------------------------------------------------------
// Value ranges and ticks
// ---------------------------------------------------------------------------

fn finalize_range(lo: f64, hi: f64) -> Result<(f64, f64), RenderError> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(RenderError::NonFiniteRange { lo, hi });
    }
    if hi - lo <= f64::EPSILON {
        return Ok((lo, lo + 1.0));
    }
    Ok((lo, hi))
}

/// Salary axis for the bar chart. Always includes zero since bars start
/// there; an empty chart gets `[0, 1]`.
pub fn bar_value_range(spec: &BarChartSpec) -> Result<(f64, f64), RenderError> {
    let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
    let mut any = false;
    for bar in &spec.bars {
        let Some(avg) = bar.average else { continue };
        any = true;
        let (left, right) = if spec.show_error_bars {
            (avg - bar.error_minus, avg + bar.error_plus)
        } else {
            (avg, avg)
        };
        lo = lo.min(left).min(avg);
        hi = hi.max(right).max(avg);
    }
    if !any {
        return Ok((0.0, 1.0));
    }
    let span = hi - lo;
    if lo < 0.0 {
        lo -= span * PAD;
    }
    hi += span * PAD;
    finalize_range(lo, hi)
}

/// Salary axis for the violin chart: the sample extrema plus padding.
pub fn violin_value_range(spec: &ViolinChartSpec) -> Result<(f64, f64), RenderError> {
    let lo = spec
        .series
        .iter()
        .map(|s| s.stats.lower_whisker)
        .fold(f64::INFINITY, f64::min);
    let hi = spec
        .series
        .iter()
        .map(|s| s.stats.upper_whisker)
        .fold(f64::NEG_INFINITY, f64::max);
    if spec.series.is_empty() {
        return Ok((0.0, 1.0));
    }
    let span = hi - lo;
    finalize_range(lo - span * PAD, hi + span * PAD)
}

/// Round tick positions (1, 2 or 5 × 10ⁿ apart) covering `[lo, hi]`, about
/// `target` of them.
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 || target == 0 {
        return vec![lo];
    }
    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let mut ticks = Vec::new();
    let mut v = (lo / step).ceil() * step;
    while v <= hi + step * 1e-9 {
        // Avoid printing -0.
        ticks.push(if v.abs() < step * 1e-9 { 0.0 } else { v });
        v += step;
    }
    ticks
}

// ---------------------------------------------------------------------------
// Pixel geometry
// ---------------------------------------------------------------------------

/// The rectangle inside the margins where data is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PlotArea {
    pub fn new(width: u32, height: u32, margins: Margins) -> Result<Self, RenderError> {
        let area = Self {
            left: margins.left,
            top: margins.top,
            right: width as f32 - margins.right,
            bottom: height as f32 - margins.bottom,
        };
        if width == 0 || height == 0 || area.right <= area.left || area.bottom <= area.top {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(area)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Map a salary onto the horizontal pixel axis.
    pub fn x_to_px(&self, value: f64, (lo, hi): (f64, f64)) -> f32 {
        self.left + ((value - lo) / (hi - lo)) as f32 * self.width()
    }

    /// Top and bottom of row `index` when the area is split into `rows`.
    pub fn row_band(&self, index: usize, rows: usize) -> (f32, f32) {
        let band = self.height() / rows.max(1) as f32;
        let top = self.top + band * index as f32;
        (top, top + band)
    }
}

/// Pixel placement of one bar and its range whisker.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub label_y: f32,
    /// `[left, top, right, bottom]`; `None` when the average is missing.
    pub bar: Option<[f32; 4]>,
    /// `(x_min, x_max, y)`; `None` when error bars are hidden.
    pub whisker: Option<(f32, f32, f32)>,
}

pub fn bar_geometry(spec: &BarChartSpec, area: &PlotArea, range: (f64, f64)) -> Vec<BarGeometry> {
    let rows = spec.bars.len();
    let zero = area.x_to_px(0.0, range);
    spec.bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let (top, bottom) = area.row_band(i, rows);
            let mid = (top + bottom) / 2.0;
            let half = (bottom - top) * BAR_FILL / 2.0;
            let rect = bar.average.map(|avg| {
                let x = area.x_to_px(avg, range);
                [zero.min(x), mid - half, zero.max(x), mid + half]
            });
            let whisker = match (spec.show_error_bars, bar.average) {
                (true, Some(avg)) => Some((
                    area.x_to_px(avg - bar.error_minus, range),
                    area.x_to_px(avg + bar.error_plus, range),
                    mid,
                )),
                _ => None,
            };
            BarGeometry {
                label_y: mid,
                bar: rect,
                whisker,
            }
        })
        .collect()
}
