use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{AVERAGE_SALARY, DEPARTMENT, MAX_SALARY, MIN_SALARY, RawTable, SalaryRecord};
use crate::format;

const ROW_HEIGHT: f32 = 18.0;

/// Rows of the loaded file shown in the side panel.
pub const PREVIEW_ROWS: usize = 50;

/// First rows of the file as loaded, every column, no formatting.
pub fn preview_table(ui: &mut Ui, table: &RawTable) {
    let shown = table.len().min(PREVIEW_ROWS);
    ui.push_id("preview_table", |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(240.0)
                .columns(Column::auto().at_least(60.0), table.headers.len())
                .header(ROW_HEIGHT, |mut header| {
                    for h in &table.headers {
                        header.col(|ui: &mut Ui| {
                            ui.strong(h);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, shown, |mut row| {
                        let cells = &table.rows[row.index()];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                });
        });
    });
    if table.len() > shown {
        ui.weak(format!("{shown} of {} rows", table.len()));
    }
}

/// The filtered and sorted records with currency formatting.
pub fn view_table(ui: &mut Ui, records: &[SalaryRecord]) {
    ui.push_id("view_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(180.0))
            .columns(Column::auto().at_least(110.0), 3)
            .header(ROW_HEIGHT, |mut header| {
                for h in [DEPARTMENT, AVERAGE_SALARY, MIN_SALARY, MAX_SALARY] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, records.len(), |mut row| {
                    let r = &records[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(&r.department);
                    });
                    for value in [r.average, r.min, r.max] {
                        row.col(|ui: &mut Ui| {
                            ui.label(format::currency_or_na(value));
                        });
                    }
                });
            });
    });
}
