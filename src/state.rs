use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::chart::palette::PaletteChoice;
use crate::config::Theme;
use crate::data::filter::SortOrder;
use crate::data::loader::{DataSource, load_source};
use crate::data::model::{RawTable, SalaryDataset};
use crate::data::simulate::{DEFAULT_SAMPLES, MAX_SAMPLES, MIN_SAMPLES, SAMPLES_STEP};
use crate::report::{Report, build_report};

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// The control values that shape a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewState {
    pub sort: SortOrder,
    pub show_error_bars: bool,
    pub palette: PaletteChoice,
    /// Departments to show; empty means all of them.
    pub selected_departments: BTreeSet<String>,
    pub show_simulation: bool,
    pub samples_per_department: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort: SortOrder::default(),
            show_error_bars: true,
            palette: PaletteChoice::default(),
            selected_departments: BTreeSet::new(),
            show_simulation: false,
            samples_per_department: DEFAULT_SAMPLES,
        }
    }
}

impl ViewState {
    /// Defaults with every department of `dataset` selected.
    pub fn for_dataset(dataset: &SalaryDataset) -> Self {
        Self {
            selected_departments: dataset.departments().into_iter().collect(),
            ..Self::default()
        }
    }

    /// Snap to the slider grid (multiples of 50 within 50..=2000).
    pub fn set_samples(&mut self, n: usize) {
        let n = n.clamp(MIN_SAMPLES, MAX_SAMPLES);
        self.samples_per_department = ((n + SAMPLES_STEP / 2) / SAMPLES_STEP) * SAMPLES_STEP;
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Message shown next to the export buttons.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Error(String),
    Saved(PathBuf),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full window session state, independent of rendering.
pub struct AppState {
    /// Where the current dataset came from.
    pub source: DataSource,

    /// The file as read, shown even when the schema check fails.
    pub preview: Option<RawTable>,

    /// Validated dataset (None while loading failed).
    pub dataset: Option<SalaryDataset>,

    /// Data-load error shown in place of the charts.
    pub load_error: Option<String>,

    /// Current control values.
    pub view: ViewState,

    pub theme: Theme,

    /// Outcome of the last export.
    pub notice: Option<Notice>,

    /// Last report together with the view it was built for.
    cache: Option<(ViewState, Arc<Report>)>,
}

impl AppState {
    pub fn new(theme: Theme) -> Self {
        Self {
            source: DataSource::Example,
            preview: None,
            dataset: None,
            load_error: None,
            view: ViewState::default(),
            theme,
            notice: None,
            cache: None,
        }
    }

    /// Load a data source, replacing the current dataset and resetting the
    /// department selection to everything in the new file.
    pub fn load(&mut self, source: DataSource) {
        self.cache = None;
        self.notice = None;
        self.dataset = None;
        self.preview = None;

        match load_source(&source) {
            Ok(table) => {
                match SalaryDataset::from_table(&table) {
                    Ok(dataset) => {
                        log::info!("Loaded {} departments from {source}", dataset.len());
                        self.view.selected_departments =
                            dataset.departments().into_iter().collect();
                        self.dataset = Some(dataset);
                        self.load_error = None;
                    }
                    Err(e) => {
                        log::error!("Rejected {source}: {e}");
                        self.load_error = Some(e.to_string());
                    }
                }
                self.preview = Some(table);
            }
            Err(e) => {
                log::error!("Failed to load {source}: {e:#}");
                self.load_error = Some(format!("Error: {e:#}"));
            }
        }
        self.source = source;
    }

    /// The report for the current view, rebuilt only when the view changed.
    pub fn report(&mut self) -> Option<Arc<Report>> {
        let dataset = self.dataset.as_ref()?;
        let fresh = matches!(&self.cache, Some((view, _)) if *view == self.view);
        if !fresh {
            let report = Arc::new(build_report(dataset, &self.view));
            self.cache = Some((self.view.clone(), report));
        }
        self.cache.as_ref().map(|(_, report)| Arc::clone(report))
    }

    /// All department names of the loaded dataset, in file order.
    pub fn departments(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(SalaryDataset::departments)
            .unwrap_or_default()
    }

    /// Toggle a single department in the selection.
    pub fn toggle_department(&mut self, department: &str) {
        let selected = &mut self.view.selected_departments;
        if !selected.remove(department) {
            selected.insert(department.to_string());
        }
    }

    /// Select every department.
    pub fn select_all(&mut self) {
        self.view.selected_departments = self.departments().into_iter().collect();
    }

    /// Clear the selection (which shows everything).
    pub fn select_none(&mut self) {
        self.view.selected_departments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> AppState {
        let mut state = AppState::new(Theme::default());
        state.load(DataSource::Example);
        state
    }

    #[test]
    fn loading_selects_every_department() {
        let state = loaded();
        assert!(state.load_error.is_none());
        assert_eq!(state.view.selected_departments.len(), 9);
        assert_eq!(state.preview.as_ref().map(RawTable::len), Some(9));
    }

    #[test]
    fn missing_file_shows_error_and_no_report() {
        let mut state = loaded();
        state.load(DataSource::File(PathBuf::from("/missing/salaries.csv")));
        assert!(state.load_error.as_deref().unwrap().starts_with("Error:"));
        assert!(state.report().is_none());
    }

    #[test]
    fn bad_schema_keeps_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrong.csv");
        std::fs::write(&path, "Team,Pay\nA,1\n").unwrap();
        let mut state = loaded();
        state.load(DataSource::File(path));
        assert!(state.load_error.as_deref().unwrap().contains("must contain columns"));
        assert_eq!(state.preview.as_ref().unwrap().headers, ["Team", "Pay"]);
        assert!(state.report().is_none());
    }

    #[test]
    fn report_is_cached_until_view_changes() {
        let mut state = loaded();
        let first = state.report().unwrap();
        let again = state.report().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        state.toggle_department("IT");
        let filtered = state.report().unwrap();
        assert!(!Arc::ptr_eq(&first, &filtered));
        assert_eq!(filtered.records.len(), 8);
    }

    #[test]
    fn toggling_and_bulk_selection() {
        let mut state = loaded();
        state.select_none();
        assert!(state.view.selected_departments.is_empty());
        // Empty selection shows everything.
        assert_eq!(state.report().unwrap().records.len(), 9);
        state.toggle_department("HR");
        assert_eq!(state.report().unwrap().records.len(), 1);
        state.select_all();
        assert_eq!(state.view.selected_departments.len(), 9);
    }

    #[test]
    fn samples_snap_to_slider_grid() {
        let mut view = ViewState::default();
        view.set_samples(10);
        assert_eq!(view.samples_per_department, 50);
        view.set_samples(326);
        assert_eq!(view.samples_per_department, 350);
        view.set_samples(99_999);
        assert_eq!(view.samples_per_department, 2000);
        view.set_samples(usize::MAX);
        assert_eq!(view.samples_per_department, 2000);
    }
}
