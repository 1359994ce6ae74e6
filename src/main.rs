mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::SuperstoreApp;
use clap::Parser;
use data::aggregate::GroupOrder;
use data::dashboard::DashboardOptions;
use eframe::egui;
use state::AppState;

/// Superstore EDA - interactive sales dashboard
#[derive(Parser, Debug)]
#[command(name = "superstore-eda")]
#[command(version)]
struct Cli {
    /// Sales file to open at startup (.csv, .json or .parquet)
    path: Option<PathBuf>,

    /// Sort summary tables by group key instead of first appearance
    #[arg(long)]
    sorted_groups: bool,

    /// Rows shown in the "View Data" preview
    #[arg(long, default_value_t = 500)]
    preview_rows: usize,

    /// Rows shown in the summary sample table
    #[arg(long, default_value_t = 5)]
    sample_rows: usize,
}

impl Cli {
    fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            group_order: if self.sorted_groups {
                GroupOrder::Sorted
            } else {
                GroupOrder::FirstSeen
            },
            sample_rows: self.sample_rows,
            preview_rows: self.preview_rows,
            ..DashboardOptions::default()
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = AppState::new(cli.dashboard_options());
    if let Some(path) = &cli.path {
        // A failed startup load leaves the window open with the error shown.
        let _ = state.load_path(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Superstore!!!",
        options,
        Box::new(|_cc| Ok(Box::new(SuperstoreApp::new(state)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_dashboard_defaults() {
        let cli = Cli::parse_from(["superstore-eda"]);
        assert_eq!(cli.dashboard_options(), DashboardOptions::default());
        assert!(cli.path.is_none());
    }

    #[test]
    fn cli_flags_map_to_options() {
        let cli = Cli::parse_from([
            "superstore-eda",
            "Superstore.csv",
            "--sorted-groups",
            "--preview-rows",
            "50",
        ]);
        let opts = cli.dashboard_options();
        assert_eq!(opts.group_order, GroupOrder::Sorted);
        assert_eq!(opts.preview_rows, 50);
        assert_eq!(cli.path, Some(PathBuf::from("Superstore.csv")));
    }
}
