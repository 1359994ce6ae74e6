use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::aggregate::{Aggregator, Axis};
use crate::data::dashboard::{Dashboard, DashboardOptions};
use crate::data::error::PipelineResult;
use crate::data::filter::{cascade, DateRange, FilterCriteria};
use crate::data::loader::load_file;
use crate::data::model::{Dataset, Dimension};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Picker choices for the cascaded location filters.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub options: DashboardOptions,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// Earliest / latest order date of the dataset.
    pub bounds: Option<(NaiveDate, NaiveDate)>,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Options offered by each location picker (cached).
    pub filter_options: FilterOptions,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Derived tables for the current selection (cached).
    pub dashboard: Option<PipelineResult<Dashboard>>,

    /// Stable colours for category / region / segment labels.
    pub colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(options: DashboardOptions) -> Self {
        Self {
            options,
            source: None,
            dataset: None,
            bounds: None,
            criteria: FilterCriteria::default(),
            filter_options: FilterOptions::default(),
            visible_indices: Vec::new(),
            dashboard: None,
            colors: ColorMap::default(),
            status_message: None,
        }
    }

    /// Load a file and replace the current dataset. On failure the previous
    /// dataset is kept and the error is shown in the status bar.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let result = load_file(path).with_context(|| format!("loading {}", path.display()));
        match result {
            Ok(dataset) => {
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }

    /// Ingest a newly loaded dataset, reset filters to its full date span.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        if dataset.is_empty() {
            log::warn!("Loaded dataset has no rows");
        }
        self.bounds = dataset.date_bounds().ok();
        self.criteria = FilterCriteria::for_dataset(&dataset);
        self.colors = ColorMap::from_labels(
            [Dimension::Region, Dimension::Category, Dimension::Segment, Dimension::SubCategory]
                .iter()
                .flat_map(|d| dataset.records.iter().map(move |r| r.dimension(*d))),
        );
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the filter cascade and every derived table.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let stages = cascade(ds, &self.criteria);
        self.filter_options = FilterOptions {
            regions: stages.region_options(),
            states: stages.state_options(),
            cities: stages.city_options(),
        };
        let dashboard = Dashboard::compute(&stages, &self.options);
        if let Err(e) = &dashboard {
            log::info!("Dashboard empty: {e}");
        }
        self.visible_indices = stages.result().indices().to_vec();
        self.dashboard = Some(dashboard);
    }

    /// Set the order-date window; `start` and `end` are inclusive.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let range = Some(DateRange::new(start, end));
        if self.criteria.date_range != range {
            self.criteria.date_range = range;
            self.refilter();
        }
    }

    fn selection_mut(&mut self, dim: Dimension) -> Option<&mut std::collections::BTreeSet<String>> {
        match dim {
            Dimension::Region => Some(&mut self.criteria.regions),
            Dimension::State => Some(&mut self.criteria.states),
            Dimension::City => Some(&mut self.criteria.cities),
            _ => None,
        }
    }

    /// Change how the sub-category pivot is laid out and aggregated.
    pub fn set_pivot(&mut self, columns: Axis, aggregator: Aggregator) {
        if self.options.pivot_columns != columns || self.options.pivot_aggregator != aggregator {
            self.options.pivot_columns = columns;
            self.options.pivot_aggregator = aggregator;
            self.refilter();
        }
    }

    /// Toggle a single value in a location filter.
    pub fn toggle_selection(&mut self, dim: Dimension, value: &str) {
        let Some(selected) = self.selection_mut(dim) else {
            return;
        };
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Clear a location filter (no restriction on that dimension).
    pub fn clear_selection(&mut self, dim: Dimension) {
        if let Some(selected) = self.selection_mut(dim) {
            selected.clear();
        }
        self.refilter();
    }

    /// Drop every location filter and restore the full date span.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria = FilterCriteria::for_dataset(ds);
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::PipelineError;
    use crate::data::model::tests::sample_dataset;

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardOptions::default());
        state.set_dataset(sample_dataset());
        state
    }

    #[test]
    fn new_dataset_shows_everything() {
        let state = loaded();
        assert_eq!(state.visible_indices.len(), 6);
        assert_eq!(state.filter_options.regions, vec!["East", "West", "Central"]);
        assert!(matches!(state.dashboard, Some(Ok(_))));
    }

    #[test]
    fn toggling_narrows_later_pickers() {
        let mut state = loaded();
        state.toggle_selection(Dimension::Region, "West");
        assert_eq!(state.filter_options.states, vec!["California"]);
        assert_eq!(state.visible_indices, vec![1, 3]);

        state.toggle_selection(Dimension::Region, "West");
        assert_eq!(state.visible_indices.len(), 6);
    }

    #[test]
    fn out_of_region_state_empties_dashboard() {
        let mut state = loaded();
        state.toggle_selection(Dimension::Region, "East");
        state.toggle_selection(Dimension::State, "California");
        assert!(state.visible_indices.is_empty());
        assert!(matches!(state.dashboard, Some(Err(PipelineError::EmptyResult))));

        state.reset_filters();
        assert_eq!(state.visible_indices.len(), 6);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        assert!(state.load_path(Path::new("/definitely/not/here.csv")).is_err());
        assert!(state.dataset.is_some());
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error"));
    }

    #[test]
    fn pivot_layout_change_recomputes() {
        let mut state = loaded();
        state.set_pivot(Axis::Year, Aggregator::Count);
        let Some(Ok(dash)) = &state.dashboard else {
            panic!("dashboard should be computed");
        };
        let grid = dash.month_pivot.as_ref().unwrap();
        assert_eq!(grid.columns, vec!["2021", "2022"]);
        assert_eq!(state.options.pivot_aggregator, Aggregator::Count);
    }
}
