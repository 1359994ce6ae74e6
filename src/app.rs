use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::{Aggregator, Axis};
use crate::data::dashboard::Dashboard;
use crate::data::export::NamedSummary;
use crate::state::AppState;
use crate::ui::tables::{self, RecordColumn};
use crate::ui::{panels, plot, show_condition, treemap};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SuperstoreApp {
    pub state: AppState,
}

impl SuperstoreApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SuperstoreApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &mut self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📊 Sample Superstore EDA");
    ui.add_space(6.0);

    let Some(result) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore sales  (File → Open…)");
        });
        return;
    };

    // Widgets only record what changed; state is updated once drawing is done.
    let mut status = None;
    let mut layout = (state.options.pivot_columns, state.options.pivot_aggregator);
    match result {
        Ok(dash) => panels_for(ui, dash, state, &mut status, &mut layout),
        Err(e) => show_condition(ui, e),
    }
    if status.is_some() {
        state.status_message = status;
    }
    state.set_pivot(layout.0, layout.1);
}

fn panels_for(
    ui: &mut Ui,
    dash: &Dashboard,
    state: &AppState,
    status: &mut Option<String>,
    layout: &mut (Axis, Aggregator),
) {
    let colors = &state.colors;

    // ---- Category bar + region donut ----
    ui.columns(2, |cols| {
        cols[0].strong("Category-wise Sales");
        match &dash.category_sales {
            Ok(t) => plot::bar_chart(&mut cols[0], "category_bar", t, colors),
            Err(e) => show_condition(&mut cols[0], e),
        }
        cols[1].strong("Region-wise Sales");
        match &dash.region_sales {
            Ok(t) => plot::pie_chart(&mut cols[1], "region_donut", t, colors, 0.5),
            Err(e) => show_condition(&mut cols[1], e),
        }
    });

    ui.columns(2, |cols| {
        if let Ok(t) = &dash.category_sales {
            cols[0].collapsing("Category_ViewData", |ui: &mut Ui| {
                tables::summary_table(ui, "category_table", t, Color32::from_rgb(49, 130, 189));
                let export = NamedSummary { name: "Category.csv", table: t };
                tables::download_button(ui, "Download Data", &export, status);
            });
        }
        if let Ok(t) = &dash.region_sales {
            cols[1].collapsing("Region_ViewData", |ui: &mut Ui| {
                tables::summary_table(ui, "region_table", t, Color32::from_rgb(230, 85, 13));
                let export = NamedSummary { name: "Region.csv", table: t };
                tables::download_button(ui, "Download Data", &export, status);
            });
        }
    });
    ui.separator();

    // ---- Time series ----
    ui.strong("📈 Time Series Analysis");
    match &dash.time_series {
        Ok(series) => {
            plot::time_series_chart(ui, series);
            ui.collapsing("View Data of TimeSeries:", |ui: &mut Ui| {
                tables::time_series_table(ui, series);
                tables::download_button(ui, "Download", series, status);
            });
        }
        Err(e) => show_condition(ui, e),
    }
    ui.separator();

    // ---- Treemap ----
    ui.strong("🗂 Hierarchical view of Sales using Treemap");
    match &dash.hierarchy_sales {
        Ok(t) => treemap::treemap(ui, t, colors),
        Err(e) => show_condition(ui, e),
    }
    ui.separator();

    // ---- Segment and category pies ----
    ui.columns(2, |cols| {
        cols[0].strong("Segment-wise Sales");
        match &dash.segment_sales {
            Ok(t) => plot::pie_chart(&mut cols[0], "segment_pie", t, colors, 0.0),
            Err(e) => show_condition(&mut cols[0], e),
        }
        cols[1].strong("Category-wise Sales");
        match &dash.category_sales {
            Ok(t) => plot::pie_chart(&mut cols[1], "category_pie", t, colors, 0.0),
            Err(e) => show_condition(&mut cols[1], e),
        }
    });
    ui.separator();

    // ---- Summary sample + pivot ----
    ui.strong("👉 Month-wise Sub-category Sales Summary");
    ui.collapsing("Summary_Table", |ui: &mut Ui| {
        tables::record_table(ui, "sample_table", &dash.sample, &RecordColumn::SAMPLE, 160.0);
        ui.add_space(8.0);
        ui.label(RichText::new(format!("📊 Pivot Table: Sub-Category vs {}", layout.0.name())).strong());
        ui.horizontal(|ui: &mut Ui| pivot_controls(ui, layout));
        match &dash.month_pivot {
            Ok(p) => {
                tables::pivot_table(ui, p);
                tables::download_button(ui, "Download Pivot Table", p, status);
            }
            Err(e) => show_condition(ui, e),
        }
    });
    ui.separator();

    // ---- Scatter ----
    ui.strong("Scatter Plot: Sales vs Profit");
    match &dash.scatter {
        Ok(points) => plot::scatter_chart(ui, points),
        Err(e) => show_condition(ui, e),
    }
    ui.collapsing("View Data", |ui: &mut Ui| {
        ui.label(format!(
            "Showing {} of {} filtered rows",
            dash.preview.len(),
            dash.filtered_rows
        ));
        tables::record_table(ui, "preview_table", &dash.preview, &RecordColumn::ALL, 320.0);
    });
}

fn pivot_controls(ui: &mut Ui, layout: &mut (Axis, Aggregator)) {
    ui.label("Columns");
    egui::ComboBox::from_id_salt("pivot_columns")
        .selected_text(layout.0.name())
        .show_ui(ui, |ui: &mut Ui| {
            for axis in [Axis::Month, Axis::Year] {
                ui.selectable_value(&mut layout.0, axis, axis.name());
            }
        });
    ui.label("Aggregate");
    egui::ComboBox::from_id_salt("pivot_aggregator")
        .selected_text(layout.1.name())
        .show_ui(ui, |ui: &mut Ui| {
            for agg in Aggregator::ALL {
                ui.selectable_value(&mut layout.1, agg, agg.name());
            }
        });
}
