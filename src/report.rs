//! One pass of the viewer: (dataset, view state) → everything on the page.
//!
//! The window calls this whenever the view state changes and the headless
//! server calls it once per request. The output depends on nothing else, so
//! two passes over the same inputs produce equal reports.

use crate::chart::spec::{BarChartSpec, ViolinChartSpec};
use crate::data::filter::view_records;
use crate::data::model::{SalaryDataset, SalaryRecord};
use crate::data::simulate::{DEFAULT_SEED, simulate_distributions};
use crate::data::summary::SummaryStats;
use crate::state::ViewState;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
    Chart(ViolinChartSpec),
    /// Simulation was requested but no department has a usable range.
    NotEnoughData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Filtered and sorted records, as listed in the table.
    pub records: Vec<SalaryRecord>,
    pub summary: SummaryStats,
    pub bar_chart: BarChartSpec,
    /// `None` unless the view asks for simulated distributions.
    pub simulation: Option<SimulationOutcome>,
}

impl Report {
    pub fn violin_chart(&self) -> Option<&ViolinChartSpec> {
        match &self.simulation {
            Some(SimulationOutcome::Chart(spec)) => Some(spec),
            _ => None,
        }
    }
}

pub fn build_report(dataset: &SalaryDataset, view: &ViewState) -> Report {
    let records = view_records(&dataset.records, &view.selected_departments, view.sort);
    let summary = SummaryStats::from_records(&records);
    let bar_chart = BarChartSpec::build(&records, view.palette, view.show_error_bars);

    let simulation = view.show_simulation.then(|| {
        let series = simulate_distributions(&records, view.samples_per_department, DEFAULT_SEED);
        if series.is_empty() {
            SimulationOutcome::NotEnoughData
        } else {
            SimulationOutcome::Chart(ViolinChartSpec::build(series, view.palette, records.len()))
        }
    });

    log::debug!(
        "Report pass: {} of {} departments, sort {:?}",
        records.len(),
        dataset.len(),
        view.sort
    );

    Report {
        records,
        summary,
        bar_chart,
        simulation,
    }
}
