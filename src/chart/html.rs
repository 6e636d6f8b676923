use maud::{DOCTYPE, Markup, PreEscaped, html};
use plotly::color::{Rgb as PlotColor, Rgba};
use plotly::common::{ErrorData, ErrorType, Font, Marker, Orientation, Title};
use plotly::layout::{Axis, Margin};
use plotly::{Bar, Layout, Plot, Trace};
use serde::Serialize;
use serde_json::Value;

use super::layout::{BAR_MARGINS, Margins, VIOLIN_MARGINS};
use super::palette::{Rgb, hex};
use super::spec::{BarChartSpec, ViolinChartSpec};
use crate::config::Theme;
use crate::format::currency_or_na;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const BAR_HOVER: &str = "<b>%{y}</b><br>Average: $%{x:,.2f}<br>%{hovertext}<extra></extra>";

fn plot_color(c: Rgb) -> PlotColor {
    PlotColor::new(c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Plotly figures
// ---------------------------------------------------------------------------

fn base_layout(title: &str, x_title: &str, height: u32, margins: Margins, theme: &Theme) -> Layout {
    Layout::new()
        .title(Title::from(title))
        .height(height as usize)
        .margin(
            Margin::new()
                .left(margins.left as usize)
                .right(margins.right as usize)
                .top(margins.top as usize)
                .bottom(margins.bottom as usize),
        )
        .show_legend(false)
        .paper_background_color(plot_color(theme.background))
        .plot_background_color(plot_color(theme.background))
        .font(Font::new().color(plot_color(theme.text)))
        .x_axis(
            Axis::new()
                .title(Title::from(x_title))
                .tick_format(",")
                .grid_color(plot_color(theme.secondary_background)),
        )
}

/// Horizontal bar chart of the averages with asymmetric min/max error bars.
///
/// Plotly stacks categories bottom-up, so rows are added in reverse to keep
/// the first department on top. Missing averages become `null`.
pub fn bar_plot(spec: &BarChartSpec, theme: &Theme) -> Plot {
    let bars: Vec<_> = spec.bars.iter().rev().collect();
    let x: Vec<Option<f64>> = bars.iter().map(|b| b.average).collect();
    let y: Vec<String> = bars.iter().map(|b| b.department.clone()).collect();
    let colors: Vec<PlotColor> = bars.iter().map(|b| plot_color(b.color)).collect();
    let ranges: Vec<String> = bars
        .iter()
        .map(|b| format!("Min: {}<br>Max: {}", currency_or_na(b.min), currency_or_na(b.max)))
        .collect();

    let errors = ErrorData::new(ErrorType::Data)
        .symmetric(false)
        .array(bars.iter().map(|b| b.error_plus).collect())
        .array_minus(bars.iter().map(|b| b.error_minus).collect())
        .thickness(1.5)
        .width(6)
        .color(Rgba::new(0, 0, 0, 0.7))
        .visible(spec.show_error_bars);

    let trace = Bar::new(x, y)
        .orientation(Orientation::Horizontal)
        .marker(Marker::new().color_array(colors))
        .hover_text_array(ranges)
        .hover_template(BAR_HOVER)
        .error_x(errors);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(base_layout(&spec.title, &spec.x_title, spec.height, BAR_MARGINS, theme));
    plot
}

/// Plotly's `violin` trace, which the `plotly` crate does not model.
#[derive(Debug, Clone, Serialize)]
struct ViolinTrace {
    r#type: &'static str,
    orientation: &'static str,
    name: String,
    x: Vec<f64>,
    points: bool,
    #[serde(rename = "box")]
    inner_box: Visible,
    line: LineColor,
}

#[derive(Debug, Clone, Serialize)]
struct Visible {
    visible: bool,
}

#[derive(Debug, Clone, Serialize)]
struct LineColor {
    color: String,
}

impl Trace for ViolinTrace {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// One horizontal violin (box inside, no points) per department, first
/// department on top.
pub fn violin_plot(spec: &ViolinChartSpec, theme: &Theme) -> Plot {
    let mut plot = Plot::new();
    for s in spec.series.iter().rev() {
        plot.add_trace(Box::new(ViolinTrace {
            r#type: "violin",
            orientation: "h",
            name: s.department.clone(),
            x: s.samples.clone(),
            points: false,
            inner_box: Visible { visible: true },
            line: LineColor { color: hex(s.color) },
        }));
    }
    plot.set_layout(base_layout(&spec.title, &spec.x_title, spec.height, VIOLIN_MARGINS, theme));
    plot
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

/// A `<div>` plus the script that draws `plot` into it.
///
/// The figure travels as a JSON data block so it can be read back out of the
/// page unchanged.
pub fn figure_block(id: &str, plot: &Plot) -> Markup {
    let payload = plot.to_json().replace("</", "<\\/");
    let draw = format!(
        "(function () {{ const fig = JSON.parse(document.getElementById(\"{id}-figure\").textContent); \
         Plotly.newPlot(\"{id}\", fig.data, fig.layout, {{ responsive: true }}); }})();"
    );
    html! {
        div id=(id) {}
        script type="application/json" id=(format!("{id}-figure")) { (PreEscaped(payload)) }
        script { (PreEscaped(draw)) }
    }
}

fn stylesheet(theme: &Theme) -> String {
    format!(
        "body {{ font-family: sans-serif; margin: 2rem; background: {bg}; color: {text}; }}
         .error {{ color: #b00020; }}
         .info {{ color: {primary}; }}
         table {{ border-collapse: collapse; }}
         td, th {{ padding: 0.25rem 0.75rem; border-bottom: 1px solid {secondary}; text-align: left; }}",
        bg = hex(theme.background),
        text = hex(theme.text),
        primary = hex(theme.primary),
        secondary = hex(theme.secondary_background),
    )
}

/// Wrap body markup into a full page that loads Plotly from the CDN.
pub fn page(title: &str, body: Markup, theme: &Theme) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                script src=(PLOTLY_CDN) {}
                style { (PreEscaped(stylesheet(theme))) }
            }
            body { (body) }
        }
    }
    .into_string()
}

/// Standalone interactive page for one figure.
pub fn standalone(title: &str, plot: &Plot, theme: &Theme) -> String {
    page(title, figure_block("chart", plot), theme)
}

pub fn bar_chart_html(spec: &BarChartSpec, theme: &Theme) -> String {
    standalone(&spec.title, &bar_plot(spec, theme), theme)
}

pub fn violin_chart_html(spec: &ViolinChartSpec, theme: &Theme) -> String {
    standalone(&spec.title, &violin_plot(spec, theme), theme)
}

/// Pull the figure JSON of block `id` back out of a page.
pub fn extract_figure(html: &str, id: &str) -> Option<Value> {
    let open = format!(r#"<script type="application/json" id="{id}-figure">"#);
    let start = html.find(&open)? + open.len();
    let end = start + html[start..].find("</script>")?;
    serde_json::from_str(&html[start..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::palette::PaletteChoice;
    use crate::data::model::SalaryRecord;
    use crate::data::simulate::simulate_distributions;

    fn spec() -> BarChartSpec {
        let mut missing = SalaryRecord::new("Legal </script>", 0.0, 0.0, 0.0);
        missing.average = None;
        missing.max = None;
        BarChartSpec::build(
            &[SalaryRecord::new("IT", 28560.18, 10544.19, 115178.51), missing],
            PaletteChoice::Plotly,
            true,
        )
    }

    #[test]
    fn html_export_preserves_data_values() {
        let html = bar_chart_html(&spec(), &Theme::default());
        let fig = extract_figure(&html, "chart").unwrap();
        let trace = &fig["data"][0];
        assert_eq!(trace["type"].as_str(), Some("bar"));
        assert_eq!(trace["orientation"].as_str(), Some("h"));
        // Bottom-up: the first department is the last category.
        assert_eq!(trace["x"][1].as_f64(), Some(28560.18));
        assert!(trace["x"][0].is_null());
        assert_eq!(trace["y"][0].as_str(), Some("Legal </script>"));
        assert_eq!(trace["y"][1].as_str(), Some("IT"));
        assert_eq!(
            trace["hovertext"][1].as_str(),
            Some("Min: $10,544.19<br>Max: $115,178.51")
        );
        assert_eq!(trace["hovertext"][0].as_str(), Some("Min: $0.00<br>Max: n/a"));
        assert_eq!(trace["error_x"]["arrayminus"][1].as_f64(), Some(28560.18 - 10544.19));
        assert_eq!(trace["error_x"]["visible"].as_bool(), Some(true));
        assert_eq!(fig["layout"]["height"].as_u64(), Some(240));
    }

    #[test]
    fn violins_list_departments_bottom_up() {
        let records = [
            SalaryRecord::new("IT", 30.0, 10.0, 90.0),
            SalaryRecord::new("HR", 20.0, 5.0, 40.0),
        ];
        let series = simulate_distributions(&records, 50, 42);
        let spec = ViolinChartSpec::build(series, PaletteChoice::Plotly, 2);
        let html = violin_chart_html(&spec, &Theme::default());
        let fig = extract_figure(&html, "chart").unwrap();
        let data = fig["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["type"].as_str(), Some("violin"));
        assert_eq!(data[0]["name"].as_str(), Some("HR"));
        assert_eq!(data[1]["name"].as_str(), Some("IT"));
        assert_eq!(data[1]["x"].as_array().unwrap().len(), 50);
        assert_eq!(data[1]["x"][0].as_f64(), Some(spec.series[0].samples[0]));
        assert_eq!(data[1]["box"]["visible"].as_bool(), Some(true));
        assert_eq!(data[1]["points"].as_bool(), Some(false));
    }

    #[test]
    fn figure_block_cannot_close_its_script_tag() {
        let block = figure_block("chart", &bar_plot(&spec(), &Theme::default())).into_string();
        assert_eq!(block.matches("</script>").count(), 2);
    }

    #[test]
    fn page_escapes_title() {
        let html = page("a < b", html! {}, &Theme::default());
        assert!(html.contains("<title>a &lt; b</title>"));
        assert!(html.contains(PLOTLY_CDN));
    }
}
