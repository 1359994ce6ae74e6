use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export::{CsvExport, RecordSet};
use crate::data::filter::apply_filters;
use crate::data::model::Dimension;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Choose your filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // ---- Date range ----
    if let Some((lo, hi)) = state.bounds {
        let (mut start, mut end) = state
            .criteria
            .date_range
            .map(|r| (r.start, r.end))
            .unwrap_or((lo, hi));

        ui.strong("Order date");
        egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
            ui.label("Start Date");
            ui.add(DatePickerButton::new(&mut start).id_salt("start_date"));
            ui.end_row();
            ui.label("End Date");
            ui.add(DatePickerButton::new(&mut end).id_salt("end_date"));
            ui.end_row();
        });
        state.set_date_range(start, end);
        if start > end {
            ui.label(RichText::new("Start date is after end date.").color(Color32::RED));
        }
        ui.separator();
    }

    if ui.button("Reset filters").clicked() {
        state.reset_filters();
    }
    ui.add_space(4.0);

    // Clone what we need so we can mutate state inside the loop.
    let pickers = [
        ("Pick Region", Dimension::Region, state.filter_options.regions.clone()),
        ("Pick State", Dimension::State, state.filter_options.states.clone()),
        ("Pick City", Dimension::City, state.filter_options.cities.clone()),
    ];

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (title, dim, options) in pickers {
                multiselect(ui, state, title, dim, options);
            }
        });
}

/// One collapsible checkbox list. Selected values that are no longer offered
/// (because an earlier filter removed them) stay listed so they can be cleared.
fn multiselect(ui: &mut Ui, state: &mut AppState, title: &str, dim: Dimension, options: Vec<String>) {
    let selected = match dim {
        Dimension::Region => state.criteria.regions.clone(),
        Dimension::State => state.criteria.states.clone(),
        _ => state.criteria.cities.clone(),
    };

    let mut values = options;
    for stale in selected.iter().filter(|s| !values.contains(*s)).cloned().collect::<Vec<_>>() {
        values.push(stale);
    }

    let header_text = if selected.is_empty() {
        format!("{title}  (all {})", values.len())
    } else {
        format!("{title}  ({}/{})", selected.len(), values.len())
    };

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(dim == Dimension::Region)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.clear_selection(dim);
            }
            for value in &values {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_selection(dim, value);
                }
            }
        });
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
            let has_data = state.dataset.is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Download Original Dataset…"))
                .clicked()
            {
                export_records(state, "Original_Dataset.csv", false);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_data, egui::Button::new("Download Filtered Data…"))
                .clicked()
            {
                export_records(state, "Filtered_Data.csv", true);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
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
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are already logged and shown in the status bar.
        let _ = state.load_path(&path);
    }
}

/// Ask where to save `export` and write it. Returns a status message on failure.
pub fn save_dialog(export: &dyn CsvExport) -> Option<String> {
    let target: Option<PathBuf> = rfd::FileDialog::new()
        .set_title("Download data")
        .set_file_name(export.file_name())
        .add_filter("CSV", &["csv"])
        .save_file();

    let path = target?;
    match export.write_csv(&path) {
        Ok(()) => None,
        Err(e) => {
            log::error!("Export to {} failed: {e}", path.display());
            Some(format!("Error: export failed: {e}"))
        }
    }
}

fn export_records(state: &mut AppState, name: &str, filtered_only: bool) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let records = if filtered_only {
        apply_filters(ds, &state.criteria).records().collect()
    } else {
        ds.records.iter().collect()
    };
    if let Some(msg) = save_dialog(&RecordSet { name, records }) {
        state.status_message = Some(msg);
    }
}
