use eframe::egui::{self, Align, Color32, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::shade;
use crate::data::aggregate::{PivotTable, SummaryTable, TimeSeries};
use crate::data::export::CsvExport;
use crate::data::model::{Dimension, Measure, Record, ORDER_DATE};
use crate::ui::format_currency;
use crate::ui::panels::save_dialog;

const ROW_HEIGHT: f32 = 18.0;

/// "Download" button that opens a save dialog for `export`.
pub fn download_button(
    ui: &mut Ui,
    text: &str,
    export: &dyn CsvExport,
    status: &mut Option<String>,
) {
    if ui.button(text).on_hover_text(export.file_name()).clicked() {
        if let Some(msg) = save_dialog(export) {
            *status = Some(msg);
        }
    }
}

/// Group columns plus the summed value, shaded by share of the largest group.
pub fn summary_table(ui: &mut Ui, id: &str, table: &SummaryTable, tint: Color32) {
    let max = table.rows.iter().map(|r| r.value).fold(0.0, f64::max);
    let header = table.header();

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(90.0), header.len())
            .header(ROW_HEIGHT, |mut row| {
                for h in &header {
                    row.col(|ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|mut body| {
                for r in &table.rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        for k in &r.key {
                            row.col(|ui| {
                                ui.label(k.as_str());
                            });
                        }
                        row.col(|ui| {
                            let t = if max > 0.0 { r.value / max } else { 0.0 };
                            ui.label(
                                RichText::new(format_currency(r.value))
                                    .background_color(shade(tint, t)),
                            );
                        });
                    });
                }
            });
    });
    ui.label(RichText::new(format!("Total {}", format_currency(table.total()))).strong());
}

/// Time series laid out with months as columns, the way it reads as a strip.
pub fn time_series_table(ui: &mut Ui, series: &TimeSeries) {
    ui.push_id("time_series_table", |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            egui::Grid::new("time_series_grid").striped(true).show(ui, |ui: &mut Ui| {
                ui.strong(TimeSeries::LABEL_COLUMN);
                for b in &series.buckets {
                    ui.label(b.label());
                }
                ui.end_row();
                ui.strong(series.value_column.column_name());
                for b in &series.buckets {
                    ui.label(format_currency(b.value));
                }
                ui.end_row();
            });
        });
    });
}

/// Pivot grid with heat shading relative to the largest cell.
pub fn pivot_table(ui: &mut Ui, table: &PivotTable) {
    let max = table.max_cell();
    let tint = Color32::from_rgb(34, 94, 168);

    ui.push_id("pivot_table", |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::auto().at_least(110.0))
                .columns(Column::auto().at_least(80.0), table.columns.len())
                .header(ROW_HEIGHT, |mut row| {
                    row.col(|ui| {
                        ui.strong(table.row_axis.name());
                    });
                    for c in &table.columns {
                        row.col(|ui| {
                            ui.strong(c.as_str());
                        });
                    }
                })
                .body(|mut body| {
                    for r in &table.rows {
                        body.row(ROW_HEIGHT, |mut row| {
                            row.col(|ui| {
                                ui.label(r.label.as_str());
                            });
                            for v in &r.cells {
                                row.col(|ui| {
                                    let t = if max > 0.0 { v / max } else { 0.0 };
                                    let text_color =
                                        if t > 0.6 { Color32::WHITE } else { Color32::BLACK };
                                    ui.label(
                                        RichText::new(format_currency(*v))
                                            .color(text_color)
                                            .background_color(shade(tint, t)),
                                    );
                                });
                            }
                        });
                    }
                });
        });
    });
}

/// Plain record listing; `columns` picks which fields to show.
pub fn record_table(
    ui: &mut Ui,
    id: &str,
    records: &[Record],
    columns: &[RecordColumn],
    max_height: f32,
) {
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(max_height)
                .columns(Column::auto().at_least(70.0), columns.len())
                .header(ROW_HEIGHT, |mut row| {
                    for c in columns {
                        row.col(|ui| {
                            ui.strong(c.title());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, records.len(), |mut row| {
                        let record = &records[row.index()];
                        for c in columns {
                            row.col(|ui| {
                                ui.label(c.render(record));
                            });
                        }
                    });
                });
        });
    });
}

/// A field of [`Record`] shown in a record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordColumn {
    OrderDate,
    Text(Dimension),
    Number(Measure),
}

impl RecordColumn {
    /// Columns of the summary sample.
    pub const SAMPLE: [RecordColumn; 6] = [
        RecordColumn::Text(Dimension::Region),
        RecordColumn::Text(Dimension::City),
        RecordColumn::Text(Dimension::Category),
        RecordColumn::Number(Measure::Sales),
        RecordColumn::Number(Measure::Profit),
        RecordColumn::Number(Measure::Quantity),
    ];

    pub const ALL: [RecordColumn; 10] = [
        RecordColumn::OrderDate,
        RecordColumn::Text(Dimension::Region),
        RecordColumn::Text(Dimension::State),
        RecordColumn::Text(Dimension::City),
        RecordColumn::Text(Dimension::Category),
        RecordColumn::Text(Dimension::SubCategory),
        RecordColumn::Text(Dimension::Segment),
        RecordColumn::Number(Measure::Sales),
        RecordColumn::Number(Measure::Profit),
        RecordColumn::Number(Measure::Quantity),
    ];

    pub fn title(self) -> &'static str {
        match self {
            RecordColumn::OrderDate => ORDER_DATE,
            RecordColumn::Text(d) => d.column_name(),
            RecordColumn::Number(m) => m.column_name(),
        }
    }

    pub fn render(self, r: &Record) -> String {
        match self {
            RecordColumn::OrderDate => r.order_date.format("%Y-%m-%d").to_string(),
            RecordColumn::Text(d) => r.dimension(d).to_string(),
            RecordColumn::Number(Measure::Quantity) => r.quantity.to_string(),
            RecordColumn::Number(m) => format!("{:.2}", r.measure(m)),
        }
    }
}
