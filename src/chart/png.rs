//! PNG export of the bar chart.
//!
//! Rasterization goes through skia's CPU raster surface and only exists when
//! the crate is built with the `png-export` feature. Without it every call
//! returns [`ExportError::RasterizerUnavailable`] so callers can show a
//! message and carry on.

use super::layout::{self, BAR_MARGINS, EXPORT_WIDTH, PlotArea};
use super::spec::BarChartSpec;
use crate::config::Theme;
use crate::error::ExportError;

/// Whether this build can rasterize.
pub const AVAILABLE: bool = cfg!(feature = "png-export");

/// Device pixels per logical pixel.
pub const SCALE: f32 = 2.0;

pub const FILE_NAME: &str = "average_salary_chart.png";

/// Pixel size of the exported image.
pub fn output_size(spec: &BarChartSpec) -> (u32, u32) {
    (
        (EXPORT_WIDTH as f32 * SCALE) as u32,
        (spec.height as f32 * SCALE) as u32,
    )
}

/// Render `spec` to PNG bytes.
pub fn render_bar_chart(spec: &BarChartSpec, theme: &Theme) -> Result<Vec<u8>, ExportError> {
    if !AVAILABLE {
        return Err(ExportError::RasterizerUnavailable);
    }
    let area = PlotArea::new(EXPORT_WIDTH, spec.height, BAR_MARGINS)?;
    let range = layout::bar_value_range(spec)?;
    let bytes = raster::draw(spec, theme, &area, range)?;
    log::info!(
        "Rendered {} bars to PNG ({} bytes)",
        spec.bars.len(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(not(feature = "png-export"))]
mod raster {
    use super::*;

    pub(super) fn draw(
        _spec: &BarChartSpec,
        _theme: &Theme,
        _area: &PlotArea,
        _range: (f64, f64),
    ) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::RasterizerUnavailable)
    }
}

#[cfg(feature = "png-export")]
mod raster {
    use skia_safe as skia;

    use super::*;
    use crate::chart::palette::Rgb;
    use crate::format;

    const TITLE_SIZE: f32 = 18.0;
    const LABEL_SIZE: f32 = 12.0;

    fn color(c: Rgb) -> skia::Color {
        skia::Color::from_argb(255, c.red, c.green, c.blue)
    }

    fn paint(c: skia::Color, stroke: Option<f32>) -> skia::Paint {
        let mut p = skia::Paint::default();
        p.set_color(c);
        p.set_anti_alias(true);
        if let Some(width) = stroke {
            p.set_style(skia::PaintStyle::Stroke);
            p.set_stroke_width(width);
        }
        p
    }

    fn font(size: f32) -> Result<skia::Font, ExportError> {
        let typeface = skia::FontMgr::default()
            .legacy_make_typeface(None::<&str>, skia::FontStyle::default())
            .ok_or(ExportError::Raster("font lookup"))?;
        Ok(skia::Font::from_typeface(typeface, size))
    }

    fn text_width(font: &skia::Font, text: &str) -> f32 {
        font.measure_str(text, None).0
    }

    pub(super) fn draw(
        spec: &BarChartSpec,
        theme: &Theme,
        area: &PlotArea,
        range: (f64, f64),
    ) -> Result<Vec<u8>, ExportError> {
        let (w, h) = output_size(spec);
        let mut surface = skia::surfaces::raster_n32_premul((w as i32, h as i32))
            .ok_or(ExportError::Raster("raster surface allocation"))?;
        let canvas = surface.canvas();
        canvas.scale((SCALE, SCALE));
        canvas.clear(color(theme.background));

        let title_font = font(TITLE_SIZE)?;
        let label_font = font(LABEL_SIZE)?;
        let text = paint(color(theme.text), None);
        let grid = paint(color(theme.secondary_background), Some(1.0));

        canvas.draw_str(&spec.title, (area.left, area.top / 2.0), &title_font, &text);

        // Grid and tick labels.
        for tick in layout::nice_ticks(range.0, range.1, 6) {
            let x = area.x_to_px(tick, range);
            canvas.draw_line((x, area.top), (x, area.bottom), &grid);
            let label = format::thousands(tick, 0);
            let half = text_width(&label_font, &label) / 2.0;
            canvas.draw_str(&label, (x - half, area.bottom + 16.0), &label_font, &text);
        }
        let x_title_w = text_width(&label_font, &spec.x_title);
        canvas.draw_str(
            &spec.x_title,
            (area.left + (area.width() - x_title_w) / 2.0, area.bottom + 32.0),
            &label_font,
            &text,
        );

        let whisker = paint(skia::Color::from_argb(179, 0, 0, 0), Some(1.5));
        for (bar, geo) in spec.bars.iter().zip(layout::bar_geometry(spec, area, range)) {
            let label_w = text_width(&label_font, &bar.department);
            canvas.draw_str(
                &bar.department,
                (area.left - label_w - 8.0, geo.label_y + LABEL_SIZE / 3.0),
                &label_font,
                &text,
            );
            if let Some([l, t, r, b]) = geo.bar {
                canvas.draw_rect(skia::Rect::from_ltrb(l, t, r, b), &paint(color(bar.color), None));
            }
            if let Some((lo, hi, y)) = geo.whisker {
                canvas.draw_line((lo, y), (hi, y), &whisker);
                canvas.draw_line((lo, y - 3.0), (lo, y + 3.0), &whisker);
                canvas.draw_line((hi, y - 3.0), (hi, y + 3.0), &whisker);
            }
        }

        let image = surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or(ExportError::Raster("PNG encoding"))?;
        Ok(data.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::palette::PaletteChoice;
    use crate::data::model::SalaryRecord;

    fn spec() -> BarChartSpec {
        BarChartSpec::build(
            &[
                SalaryRecord::new("IT", 28560.18, 10544.19, 115178.51),
                SalaryRecord::new("HR", 26539.92, 8823.46, 58951.29),
            ],
            PaletteChoice::Viridis,
            true,
        )
    }

    #[test]
    fn output_is_twice_the_logical_size() {
        assert_eq!(output_size(&spec()), (1800, 480));
    }

    #[cfg(not(feature = "png-export"))]
    #[test]
    fn missing_rasterizer_is_reported() {
        let err = render_bar_chart(&spec(), &Theme::default()).unwrap_err();
        assert!(matches!(err, ExportError::RasterizerUnavailable));
        assert!(err.to_string().contains("png-export"));
    }

    #[cfg(feature = "png-export")]
    #[test]
    fn png_decodes_to_expected_size() {
        let spec = spec();
        let before = spec.clone();
        let bytes = render_bar_chart(&spec, &Theme::default()).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), output_size(&spec));
        assert_eq!(spec, before);
    }
}
