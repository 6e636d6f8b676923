use std::fmt;
use std::path::Path;

use crate::chart::{html, png};
use crate::config::Theme;
use crate::data::model::{AVERAGE_SALARY, DEPARTMENT, MAX_SALARY, MIN_SALARY, SalaryRecord};
use crate::error::ExportError;
use crate::report::Report;

/// The downloads offered next to the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Png,
    BarHtml,
    ViolinHtml,
    Csv,
}

impl ExportKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::Png => png::FILE_NAME,
            ExportKind::BarHtml => "average_salary_chart.html",
            ExportKind::ViolinHtml => "simulated_violin.html",
            ExportKind::Csv => "salary_view.csv",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportKind::Png => "image/png",
            ExportKind::BarHtml | ExportKind::ViolinHtml => "text/html; charset=utf-8",
            ExportKind::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::Png => "png",
            ExportKind::BarHtml | ExportKind::ViolinHtml => "html",
            ExportKind::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExportKind::Png => "chart as PNG",
            ExportKind::BarHtml => "interactive chart (HTML)",
            ExportKind::ViolinHtml => "simulated violin (HTML)",
            ExportKind::Csv => "table (CSV)",
        };
        f.write_str(label)
    }
}

/// Serialize one part of the report.
pub fn export_bytes(report: &Report, theme: &Theme, kind: ExportKind) -> Result<Vec<u8>, ExportError> {
    match kind {
        ExportKind::Png => png::render_bar_chart(&report.bar_chart, theme),
        ExportKind::BarHtml => Ok(html::bar_chart_html(&report.bar_chart, theme).into_bytes()),
        ExportKind::ViolinHtml => {
            let spec = report
                .violin_chart()
                .ok_or(ExportError::NothingToExport("no simulated distributions"))?;
            Ok(html::violin_chart_html(spec, theme).into_bytes())
        }
        ExportKind::Csv => view_csv(&report.records),
    }
}

pub fn write_export(
    report: &Report,
    theme: &Theme,
    kind: ExportKind,
    path: &Path,
) -> Result<(), ExportError> {
    let bytes = export_bytes(report, theme, kind)?;
    std::fs::write(path, &bytes)?;
    log::info!("Exported {kind} to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// The current view as CSV with the input column names. Missing values are
/// empty cells.
pub fn view_csv(records: &[SalaryRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([DEPARTMENT, AVERAGE_SALARY, MIN_SALARY, MAX_SALARY])?;
    let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for r in records {
        writer.write_record([
            r.department.clone(),
            cell(r.average),
            cell(r.min),
            cell(r.max),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
