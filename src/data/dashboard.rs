use super::aggregate::{
    aggregate_by, monthly_time_series, pivot, scatter_points, Aggregator, Axis, GroupOrder,
    PivotTable, ScatterPoint, SummaryTable, TimeSeries,
};
use super::error::{PipelineError, PipelineResult};
use super::filter::FilterCascade;
use super::model::{Dimension, Measure, Record};

/// Knobs for one dashboard recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub group_order: GroupOrder,
    /// Rows shown in the summary sample table.
    pub sample_rows: usize,
    /// Rows shown in the filtered data preview.
    pub preview_rows: usize,
    /// Columns of the sub-category pivot: [`Axis::Month`] or [`Axis::Year`].
    pub pivot_columns: Axis,
    pub pivot_aggregator: Aggregator,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        DashboardOptions {
            group_order: GroupOrder::FirstSeen,
            sample_rows: 5,
            preview_rows: 500,
            pivot_columns: Axis::Month,
            pivot_aggregator: Aggregator::Sum,
        }
    }
}

/// Every derived table for one filter selection.
///
/// Panels that need an optional column carry their own error so the rest of
/// the dashboard still renders when e.g. `Sub-Category` is absent.
#[derive(Debug)]
pub struct Dashboard {
    pub filtered_rows: usize,
    pub category_sales: PipelineResult<SummaryTable>,
    pub region_sales: PipelineResult<SummaryTable>,
    pub segment_sales: PipelineResult<SummaryTable>,
    /// Region → Category → Sub-Category, feeds the treemap.
    pub hierarchy_sales: PipelineResult<SummaryTable>,
    pub time_series: PipelineResult<TimeSeries>,
    /// Sub-Category × month name (or year).
    pub month_pivot: PipelineResult<PivotTable>,
    pub scatter: PipelineResult<Vec<ScatterPoint>>,
    /// First rows of the date-filtered data, before any location filter.
    pub sample: Vec<Record>,
    pub preview: Vec<Record>,
}

impl Dashboard {
    /// Compute all panels from a filter cascade. An empty final view yields
    /// [`PipelineError::EmptyResult`] without running any aggregation.
    pub fn compute(stages: &FilterCascade<'_>, options: &DashboardOptions) -> PipelineResult<Self> {
        let view = stages.result();
        if view.is_empty() {
            return Err(PipelineError::EmptyResult);
        }

        let order = options.group_order;
        let by = |dims: &[Dimension]| aggregate_by(view, dims, Measure::Sales, order);

        let dashboard = Dashboard {
            filtered_rows: view.len(),
            category_sales: by(&[Dimension::Category]),
            region_sales: by(&[Dimension::Region]),
            segment_sales: by(&[Dimension::Segment]),
            hierarchy_sales: by(&[Dimension::Region, Dimension::Category, Dimension::SubCategory]),
            time_series: monthly_time_series(view, Measure::Sales),
            month_pivot: pivot(
                view,
                Axis::Dimension(Dimension::SubCategory),
                options.pivot_columns,
                Measure::Sales,
                options.pivot_aggregator,
                0.0,
            ),
            scatter: scatter_points(view),
            sample: stages.by_date.head(options.sample_rows),
            preview: view.head(options.preview_rows),
        };

        for (panel, err) in dashboard.panel_errors() {
            log::warn!("{panel} unavailable: {err}");
        }
        Ok(dashboard)
    }

    /// Panels that could not be computed, by title.
    pub fn panel_errors(&self) -> Vec<(&'static str, &PipelineError)> {
        [
            ("Category-wise Sales", self.category_sales.as_ref().err()),
            ("Region-wise Sales", self.region_sales.as_ref().err()),
            ("Segment-wise Sales", self.segment_sales.as_ref().err()),
            ("Treemap", self.hierarchy_sales.as_ref().err()),
            ("Time Series", self.time_series.as_ref().err()),
            ("Pivot Table", self.month_pivot.as_ref().err()),
            ("Scatter Plot", self.scatter.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(name, err)| err.map(|e| (name, e)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{cascade, DateRange, FilterCriteria};
    use crate::data::model::tests::{full_columns, sample_dataset};
    use crate::data::model::Dataset;
    use chrono::NaiveDate;

    #[test]
    fn all_panels_present_for_full_dataset() {
        let ds = sample_dataset();
        let stages = cascade(&ds, &FilterCriteria::for_dataset(&ds));
        let dash = Dashboard::compute(&stages, &DashboardOptions::default()).unwrap();

        assert_eq!(dash.filtered_rows, 6);
        assert!(dash.panel_errors().is_empty());
        assert_eq!(dash.sample.len(), 5);
        assert_eq!(dash.preview.len(), 6);
        let total = dash.category_sales.as_ref().unwrap().total();
        let by_region = dash.region_sales.as_ref().unwrap().total();
        assert!((total - by_region).abs() < 1e-9);
    }

    #[test]
    fn empty_selection_short_circuits() {
        let ds = sample_dataset();
        let day = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let criteria = FilterCriteria {
            date_range: Some(DateRange::new(day, day)),
            ..FilterCriteria::default()
        };
        let stages = cascade(&ds, &criteria);
        assert!(matches!(
            Dashboard::compute(&stages, &DashboardOptions::default()),
            Err(PipelineError::EmptyResult)
        ));
    }

    #[test]
    fn missing_sub_category_only_affects_its_panels() {
        let mut cols = full_columns();
        cols.retain(|c| c != "Sub-Category");
        let ds = Dataset::new(sample_dataset().records, cols);
        let stages = cascade(&ds, &FilterCriteria::default());
        let dash = Dashboard::compute(&stages, &DashboardOptions::default()).unwrap();

        let failed: Vec<_> = dash.panel_errors().into_iter().map(|(name, _)| name).collect();
        assert_eq!(failed, vec!["Treemap", "Pivot Table"]);
        assert!(dash.category_sales.is_ok());
    }

    #[test]
    fn sample_ignores_location_filters() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            regions: ["Central".to_string()].into_iter().collect(),
            ..FilterCriteria::default()
        };
        let options = DashboardOptions {
            sample_rows: 3,
            ..DashboardOptions::default()
        };
        let dash = Dashboard::compute(&cascade(&ds, &criteria), &options).unwrap();
        assert_eq!(dash.filtered_rows, 1);
        assert_eq!(dash.sample.len(), 3);
        assert_eq!(dash.sample[0].region, "East");
    }

    #[test]
    fn pivot_follows_options() {
        let ds = sample_dataset();
        let options = DashboardOptions {
            pivot_columns: Axis::Year,
            pivot_aggregator: Aggregator::Max,
            ..DashboardOptions::default()
        };
        let dash = Dashboard::compute(&cascade(&ds, &FilterCriteria::default()), &options).unwrap();
        let grid = dash.month_pivot.unwrap();
        assert_eq!(grid.column_axis, Axis::Year);
        assert_eq!(grid.columns, vec!["2021", "2022"]);
        let phones = grid.rows.iter().find(|r| r.label == "Phones").unwrap();
        assert_eq!(phones.cells, vec![300.0, 0.0]);
    }
}
