use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::palette::PaletteChoice;
use crate::chart::png;
use crate::data::filter::SortOrder;
use crate::data::loader::DataSource;
use crate::data::simulate::{MAX_SAMPLES, MIN_SAMPLES, SAMPLES_STEP};
use crate::export::{ExportKind, write_export};
use crate::report::Report;
use crate::state::{AppState, Notice};
use crate::ui::table;

const WARNING_COLOR: Color32 = Color32::from_rgb(0xd9, 0x8c, 0x00);

const SIMULATION_WARNING: &str = "Only use for illustration when you don't have raw salary \
    records. Simulated data is not the real distribution.";

// ---------------------------------------------------------------------------
// Left side panel – data and chart controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            data_section(ui, state);
            ui.separator();

            if state.dataset.is_none() {
                ui.label("No dataset loaded.");
                return;
            }

            chart_options(ui, state);
            ui.separator();
            department_filter(ui, state);
            ui.separator();
            simulation_options(ui, state);
        });
}

fn data_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data");
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Open…").clicked() {
            open_file_dialog(state);
        }
        if ui.button("Use example").clicked() {
            state.load(DataSource::Example);
        }
    });
    ui.weak(format!("Source: {}", state.source));

    if let Some(preview) = &state.preview {
        egui::CollapsingHeader::new(RichText::new("Preview").strong())
            .id_salt("preview")
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                table::preview_table(ui, preview);
            });
    }
}

fn chart_options(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Chart options");

    ui.strong("Sort by");
    for order in SortOrder::ALL {
        ui.radio_value(&mut state.view.sort, order, order.to_string());
    }

    ui.checkbox(&mut state.view.show_error_bars, "Show Min/Max ranges as error bars");

    ui.strong("Color palette");
    egui::ComboBox::from_id_salt("palette")
        .selected_text(state.view.palette.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for choice in PaletteChoice::ALL {
                ui.selectable_value(&mut state.view.palette, choice, choice.to_string());
            }
        });
}

fn department_filter(ui: &mut Ui, state: &mut AppState) {
    let departments = state.departments();
    let n_selected = state.view.selected_departments.len();
    ui.heading("Filter");
    let header_text = format!("Departments  ({n_selected}/{})", departments.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("departments")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all();
                }
                if ui.small_button("None").clicked() {
                    state.select_none();
                }
            });

            for department in &departments {
                let mut checked = state.view.selected_departments.contains(department);
                if ui.checkbox(&mut checked, department).changed() {
                    state.toggle_department(department);
                }
            }

            if state.view.selected_departments.is_empty() {
                ui.weak("Empty selection shows all departments.");
            }
        });
}

fn simulation_options(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Simulated distributions (optional)");
    ui.checkbox(
        &mut state.view.show_simulation,
        "Show simulated violin plots (triangular from Min/Average/Max)",
    );

    let mut samples = state.view.samples_per_department;
    let slider = egui::Slider::new(&mut samples, MIN_SAMPLES..=MAX_SAMPLES)
        .step_by(SAMPLES_STEP as f64)
        .text("Samples per department");
    if ui.add_enabled(state.view.show_simulation, slider).changed() {
        state.view.set_samples(samples);
    }
    ui.label(RichText::new(SIMULATION_WARNING).color(WARNING_COLOR));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Use example").clicked() {
                state.load(DataSource::Example);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(loaded) = state.dataset.as_ref().map(|ds| ds.len()) {
            let shown = state.report().map_or(0, |r| r.records.len());
            ui.label(format!("{loaded} departments loaded, {shown} shown"));
        }

        if let Some(msg) = &state.load_error {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open salary summary")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(DataSource::File(path));
    }
}

/// Ask where to save `kind` and write it, recording the outcome as a notice.
pub fn save_export(state: &mut AppState, report: &Report, kind: ExportKind) {
    let Some(path) = rfd::FileDialog::new()
        .set_title(format!("Save {kind}"))
        .set_file_name(kind.file_name())
        .add_filter(kind.extension().to_uppercase(), &[kind.extension()])
        .save_file()
    else {
        return;
    };

    state.notice = Some(match write_export(report, &state.theme, kind, &path) {
        Ok(()) => {
            log::info!("Saved {kind} to {}", path.display());
            Notice::Saved(path)
        }
        Err(e) => {
            log::error!("Export of {kind} failed: {e}");
            Notice::Error(format!("Export failed: {e}"))
        }
    });
}

// ---------------------------------------------------------------------------
// Export controls
// ---------------------------------------------------------------------------

/// Download buttons below the bar chart.
pub fn export_buttons(ui: &mut Ui, state: &mut AppState, report: &Report) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        if png::AVAILABLE {
            if ui.button("Download chart as PNG").clicked() {
                save_export(state, report, ExportKind::Png);
            }
        } else {
            ui.weak("PNG export needs a build with the png-export feature.");
        }
        if ui.button("Download interactive chart (HTML)").clicked() {
            save_export(state, report, ExportKind::BarHtml);
        }
        if ui.button("Download table (CSV)").clicked() {
            save_export(state, report, ExportKind::Csv);
        }
    });
    notice_label(ui, state.notice.as_ref());
}

pub fn notice_label(ui: &mut Ui, notice: Option<&Notice>) {
    match notice {
        Some(Notice::Error(msg)) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        Some(Notice::Saved(path)) => {
            ui.weak(format!("Saved {}", path.display()));
        }
        None => {}
    }
}
