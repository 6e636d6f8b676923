use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::spec::VIOLIN_TITLE;
use crate::export::ExportKind;
use crate::format::currency_or_na;
use crate::report::{Report, SimulationOutcome};
use crate::state::AppState;
use crate::ui::{panels, plot, table};

pub const TITLE: &str = "Salary Summary Visualizer (Average, Min, Max)";

const BAR_SUBHEADING: &str = "Average Salary with Min/Max Ranges";

const NOTES: &str = "\
Notes:
• The bar chart shows the department Average_Salary with Min/Max ranges shown as asymmetric error bars.
• If you want boxplots or real distribution plots, provide raw salary records instead of min/avg/max summaries.
• Simulated violin plots use a triangular distribution (min, mode=average, max) and are for illustration only.";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalaryVizApp {
    pub state: AppState,
}

impl SalaryVizApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalaryVizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: data and chart controls ----
        egui::SidePanel::left("control_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        let report = if self.state.load_error.is_none() {
            self.state.report()
        } else {
            None
        };

        // ---- Right side panel: summary and simulation ----
        if let Some(report) = &report {
            egui::SidePanel::right("summary_panel")
                .default_width(380.0)
                .resizable(true)
                .show(ctx, |ui| {
                    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                        summary_panel(ui, &mut self.state, report);
                    });
                });
        }

        // ---- Central panel: bar chart, table, notes ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(TITLE);
            ui.separator();

            if let Some(err) = &self.state.load_error {
                ui.label(RichText::new(err).color(Color32::RED));
                return;
            }
            let Some(report) = report else {
                ui.label("No dataset loaded.");
                return;
            };

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.label(RichText::new(BAR_SUBHEADING).strong().size(18.0));
                    plot::bar_chart(ui, &report.bar_chart);
                    panels::export_buttons(ui, &mut self.state, &report);

                    ui.add_space(8.0);
                    ui.label(RichText::new("Table (current view)").strong().size(16.0));
                    table::view_table(ui, &report.records);

                    ui.add_space(12.0);
                    ui.separator();
                    ui.weak(NOTES);
                });
        });
    }
}

// ---------------------------------------------------------------------------
// Summary column
// ---------------------------------------------------------------------------

fn summary_panel(ui: &mut Ui, state: &mut AppState, report: &Report) {
    let summary = &report.summary;

    ui.heading("Summary statistics");
    ui.label("Mean of department averages");
    ui.label(
        RichText::new(currency_or_na(summary.mean_of_averages))
            .size(26.0)
            .strong(),
    )
    .on_hover_text("Average of the Average_Salary column");
    ui.label(format!("Departments shown: {}", summary.departments));
    ui.label(format!("Min of mins: {}", currency_or_na(summary.min_of_mins)));
    ui.label(format!("Max of maxes: {}", currency_or_na(summary.max_of_maxes)));

    let Some(simulation) = &report.simulation else {
        return;
    };
    ui.separator();
    ui.label(RichText::new(VIOLIN_TITLE).strong().size(18.0));
    match simulation {
        SimulationOutcome::Chart(spec) => {
            plot::violin_chart(ui, spec);
            if ui.button("Download simulated violin (HTML)").clicked() {
                panels::save_export(state, report, ExportKind::ViolinHtml);
            }
        }
        SimulationOutcome::NotEnoughData => {
            ui.label(
                RichText::new("Not enough valid Min/Average/Max ranges to simulate distributions.")
                    .color(Color32::from_rgb(0xd9, 0x8c, 0x00)),
            );
        }
    }
}
