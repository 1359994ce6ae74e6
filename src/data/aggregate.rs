//! Grouping, time bucketing and cross-tabulation over a [`FilteredView`].
//!
//! Every function here checks the fields it needs against the source columns
//! before touching any row, and treats an empty view as
//! [`PipelineError::EmptyResult`] so callers never draw an empty chart.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::{Datelike, Month, NaiveDate};

use super::error::{PipelineError, PipelineResult};
use super::filter::FilteredView;
use super::model::{Dimension, Measure, Record};

fn require_rows(view: &FilteredView<'_>) -> PipelineResult<()> {
    if view.is_empty() {
        Err(PipelineError::EmptyResult)
    } else {
        Ok(())
    }
}

fn require_measure(view: &FilteredView<'_>, measure: Measure) -> PipelineResult<()> {
    view.dataset().require_column(measure.column_name())
}

fn require_dimensions(view: &FilteredView<'_>, dims: &[Dimension]) -> PipelineResult<()> {
    dims.iter()
        .try_for_each(|d| view.dataset().require_column(d.column_name()))
}

// ---------------------------------------------------------------------------
// SummaryTable – group by one or more dimensions, sum a measure
// ---------------------------------------------------------------------------

/// Row order of a [`SummaryTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrder {
    /// Order in which each group key first appears in the view.
    #[default]
    FirstSeen,
    /// Lexicographic by group key.
    Sorted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// One value per group column.
    pub key: Vec<String>,
    pub value: f64,
}

impl SummaryRow {
    /// Key values joined for display, e.g. `West / Furniture`.
    pub fn label(&self) -> String {
        self.key.join(" / ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub group_columns: Vec<Dimension>,
    pub value_column: Measure,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    /// Header row: the group columns then the value column.
    pub fn header(&self) -> Vec<&'static str> {
        self.group_columns
            .iter()
            .map(|d| d.column_name())
            .chain(std::iter::once(self.value_column.column_name()))
            .collect()
    }
}

/// Group the view by the combinations of `group` values that actually occur
/// and sum `sum` within each group. Rows with a blank group value are left
/// out; if that leaves nothing the result is [`PipelineError::EmptyResult`].
pub fn aggregate_by(
    view: &FilteredView<'_>,
    group: &[Dimension],
    sum: Measure,
    order: GroupOrder,
) -> PipelineResult<SummaryTable> {
    require_dimensions(view, group)?;
    require_measure(view, sum)?;
    require_rows(view)?;

    let mut slots: HashMap<Vec<&str>, usize> = HashMap::new();
    let mut rows: Vec<SummaryRow> = Vec::new();
    for record in view.records() {
        let key: Vec<&str> = group.iter().map(|d| record.dimension(*d)).collect();
        if key.iter().any(|k| k.is_empty()) {
            continue;
        }
        let slot = *slots.entry(key).or_insert_with_key(|k| {
            rows.push(SummaryRow {
                key: k.iter().map(|s| s.to_string()).collect(),
                value: 0.0,
            });
            rows.len() - 1
        });
        rows[slot].value += record.measure(sum);
    }

    if rows.is_empty() {
        return Err(PipelineError::EmptyResult);
    }
    if order == GroupOrder::Sorted {
        rows.sort_by(|a, b| a.key.cmp(&b.key));
    }

    Ok(SummaryTable {
        group_columns: group.to_vec(),
        value_column: sum,
        rows,
    })
}

// ---------------------------------------------------------------------------
// TimeSeries – monthly buckets of the order date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub value: f64,
}

impl MonthBucket {
    /// `YYYY-Mon`, e.g. `2021-Jan`.
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%Y-%b").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub value_column: Measure,
    /// Chronological by (year, month).
    pub buckets: Vec<MonthBucket>,
}

impl TimeSeries {
    pub const LABEL_COLUMN: &'static str = "month_year";
}

/// Sum `sum` per calendar month of the order date.
pub fn monthly_time_series(view: &FilteredView<'_>, sum: Measure) -> PipelineResult<TimeSeries> {
    require_measure(view, sum)?;
    require_rows(view)?;

    let mut sums: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for record in view.records() {
        let d = record.order_date;
        *sums.entry((d.year(), d.month())).or_insert(0.0) += record.measure(sum);
    }

    Ok(TimeSeries {
        value_column: sum,
        buckets: sums
            .into_iter()
            .map(|((year, month), value)| MonthBucket { year, month, value })
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// PivotTable – cross-tabulate two axes
// ---------------------------------------------------------------------------

/// Something a pivot can be laid out along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Dimension(Dimension),
    /// Calendar month name of the order date (`January`…).
    Month,
    /// Calendar year of the order date.
    Year,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Dimension(d) => d.column_name(),
            Axis::Month => "Month",
            Axis::Year => "Year",
        }
    }

    /// `None` for a blank dimension value.
    fn key(self, record: &Record) -> Option<AxisKey> {
        match self {
            Axis::Dimension(d) => {
                let value = record.dimension(d);
                (!value.is_empty()).then(|| AxisKey::Text(value.to_string()))
            }
            Axis::Month => Some(AxisKey::Month(record.order_date.month())),
            Axis::Year => Some(AxisKey::Year(record.order_date.year())),
        }
    }

    fn require(self, view: &FilteredView<'_>) -> PipelineResult<()> {
        match self {
            Axis::Dimension(d) => require_dimensions(view, &[d]),
            Axis::Month | Axis::Year => Ok(()),
        }
    }
}

/// Ordered axis value: months sort chronologically, text lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum AxisKey {
    Month(u32),
    Year(i32),
    Text(String),
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKey::Month(m) => {
                let name = u8::try_from(*m)
                    .ok()
                    .and_then(|m| Month::try_from(m).ok())
                    .map(|m| m.name())
                    .unwrap_or("?");
                f.write_str(name)
            }
            AxisKey::Year(y) => write!(f, "{y}"),
            AxisKey::Text(s) => f.write_str(s),
        }
    }
}

/// How the records falling into one pivot cell are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregator {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl Aggregator {
    pub const ALL: [Aggregator; 5] = [
        Aggregator::Sum,
        Aggregator::Mean,
        Aggregator::Count,
        Aggregator::Min,
        Aggregator::Max,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Aggregator::Sum => "Sum",
            Aggregator::Mean => "Mean",
            Aggregator::Count => "Count",
            Aggregator::Min => "Min",
            Aggregator::Max => "Max",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Accumulator {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    fn finish(&self, agg: Aggregator) -> f64 {
        match agg {
            Aggregator::Sum => self.sum,
            Aggregator::Mean => self.sum / self.count as f64,
            Aggregator::Count => self.count as f64,
            Aggregator::Min => self.min,
            Aggregator::Max => self.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub label: String,
    /// One cell per entry of [`PivotTable::columns`].
    pub cells: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub row_axis: Axis,
    pub column_axis: Axis,
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// Largest cell value, used to scale the heat shading.
    pub fn max_cell(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Cross-tabulate `row_axis` × `column_axis`, combining `value` with `agg`.
/// Every row gets a cell for every column; combinations without records hold
/// `fill`. Records with a blank axis value are skipped.
pub fn pivot(
    view: &FilteredView<'_>,
    row_axis: Axis,
    column_axis: Axis,
    value: Measure,
    agg: Aggregator,
    fill: f64,
) -> PipelineResult<PivotTable> {
    row_axis.require(view)?;
    column_axis.require(view)?;
    require_measure(view, value)?;
    require_rows(view)?;

    let mut cells: BTreeMap<(AxisKey, AxisKey), Accumulator> = BTreeMap::new();
    let mut row_keys: BTreeSet<AxisKey> = BTreeSet::new();
    let mut col_keys: BTreeSet<AxisKey> = BTreeSet::new();

    for record in view.records() {
        let (Some(r), Some(c)) = (row_axis.key(record), column_axis.key(record)) else {
            continue;
        };
        row_keys.insert(r.clone());
        col_keys.insert(c.clone());
        cells
            .entry((r, c))
            .or_insert_with(Accumulator::new)
            .push(record.measure(value));
    }

    if cells.is_empty() {
        return Err(PipelineError::EmptyResult);
    }

    let rows = row_keys
        .into_iter()
        .map(|r| {
            let cells = col_keys
                .iter()
                .map(|c| {
                    cells
                        .get(&(r.clone(), c.clone()))
                        .map(|acc| acc.finish(agg))
                        .unwrap_or(fill)
                })
                .collect();
            PivotRow {
                label: r.to_string(),
                cells,
            }
        })
        .collect();

    Ok(PivotTable {
        row_axis,
        column_axis,
        columns: col_keys.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}

// ---------------------------------------------------------------------------
// Scatter – one point per record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
}

/// Sales against profit for every row, sized by quantity.
pub fn scatter_points(view: &FilteredView<'_>) -> PipelineResult<Vec<ScatterPoint>> {
    require_measure(view, Measure::Profit)?;
    require_measure(view, Measure::Quantity)?;
    require_rows(view)?;

    Ok(view
        .records()
        .map(|r| ScatterPoint {
            sales: r.sales,
            profit: r.profit,
            quantity: r.quantity,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filters, FilterCriteria};
    use crate::data::model::tests::{full_columns, record, sample_dataset};
    use crate::data::model::Dataset;
    use std::collections::BTreeSet;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    impl SummaryTable {
        fn get(&self, key: &[&str]) -> Option<f64> {
            self.rows
                .iter()
                .find(|r| r.key.iter().map(String::as_str).eq(key.iter().copied()))
                .map(|r| r.value)
        }
    }

    impl PivotTable {
        fn get(&self, row: &str, column: &str) -> Option<f64> {
            let c = self.columns.iter().position(|c| c == column)?;
            self.rows
                .iter()
                .find(|r| r.label == row)
                .and_then(|r| r.cells.get(c).copied())
        }
    }

    #[test]
    fn group_sums_match_rows_and_total() {
        let ds = sample_dataset();
        let view = FilteredView::full(&ds);
        let table =
            aggregate_by(&view, &[Dimension::Category], Measure::Sales, GroupOrder::FirstSeen)
                .unwrap();

        let keys: Vec<_> = table.rows.iter().map(|r| r.key[0].as_str()).collect();
        assert_eq!(keys, vec!["Technology", "Furniture", "Office Supplies"]);
        assert!(approx(table.get(&["Technology"]).unwrap(), 380.0));
        assert!(approx(table.get(&["Furniture"]).unwrap(), 530.5));
        assert!(approx(table.get(&["Office Supplies"]).unwrap(), 58.0));

        let whole: f64 = view.records().map(|r| r.sales).sum();
        assert!(approx(table.total(), whole));
    }

    #[test]
    fn sorted_order_is_opt_in() {
        let ds = sample_dataset();
        let view = FilteredView::full(&ds);
        let table =
            aggregate_by(&view, &[Dimension::Region], Measure::Sales, GroupOrder::Sorted).unwrap();
        let keys: Vec<_> = table.rows.iter().map(|r| r.key[0].as_str()).collect();
        assert_eq!(keys, vec!["Central", "East", "West"]);
    }

    #[test]
    fn only_occurring_combinations_are_grouped() {
        let ds = sample_dataset();
        let view = FilteredView::full(&ds);
        let table = aggregate_by(
            &view,
            &[Dimension::Region, Dimension::Category],
            Measure::Sales,
            GroupOrder::FirstSeen,
        )
        .unwrap();
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.get(&["Central", "Technology"]), None);
        assert_eq!(table.header(), vec!["Region", "Category", "Sales"]);
    }

    #[test]
    fn months_are_chronological_not_lexical() {
        let ds = Dataset::new(
            vec![
                record("2021-12-05", "East", "NY", "NYC", "Tech", "Phones", 1.0),
                record("2022-01-09", "East", "NY", "NYC", "Tech", "Phones", 2.0),
                record("2021-11-11", "East", "NY", "NYC", "Tech", "Phones", 4.0),
                record("2021-12-24", "East", "NY", "NYC", "Tech", "Phones", 8.0),
            ],
            full_columns(),
        );
        let series = monthly_time_series(&FilteredView::full(&ds), Measure::Sales).unwrap();
        let labels: Vec<_> = series.buckets.iter().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["2021-Nov", "2021-Dec", "2022-Jan"]);
        let values: Vec<_> = series.buckets.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![4.0, 9.0, 2.0]);
    }

    #[test]
    fn pivot_fills_missing_cells() {
        let ds = Dataset::new(
            vec![
                record("2021-01-10", "East", "NY", "NYC", "Tech", "A", 5.0),
                record("2021-02-10", "East", "NY", "NYC", "Tech", "B", 0.0),
                record("2021-01-20", "East", "NY", "NYC", "Tech", "A", 2.5),
            ],
            full_columns(),
        );
        let view = FilteredView::full(&ds);
        let table = pivot(
            &view,
            Axis::Dimension(Dimension::SubCategory),
            Axis::Month,
            Measure::Sales,
            Aggregator::Sum,
            0.0,
        )
        .unwrap();

        assert_eq!(table.columns, vec!["January", "February"]);
        assert_eq!(table.get("A", "January"), Some(7.5));
        assert_eq!(table.get("A", "February"), Some(0.0));
        assert_eq!(table.get("B", "January"), Some(0.0));
        assert_eq!(table.get("B", "February"), Some(0.0));
        assert!(table.rows.iter().all(|r| r.cells.len() == table.columns.len()));
    }

    #[test]
    fn pivot_uses_fill_value_and_aggregator() {
        let ds = sample_dataset();
        let view = FilteredView::full(&ds);
        let table = pivot(
            &view,
            Axis::Dimension(Dimension::Region),
            Axis::Year,
            Measure::Sales,
            Aggregator::Count,
            -1.0,
        )
        .unwrap();
        assert_eq!(table.columns, vec!["2021", "2022"]);
        assert_eq!(table.get("East", "2021"), Some(2.0));
        assert_eq!(table.get("West", "2022"), Some(-1.0));
        assert_eq!(table.get("Central", "2021"), Some(-1.0));

        let mean = pivot(
            &view,
            Axis::Dimension(Dimension::Region),
            Axis::Year,
            Measure::Sales,
            Aggregator::Mean,
            0.0,
        )
        .unwrap();
        assert!(approx(mean.get("West", "2021").unwrap(), 100.25));
    }

    #[test]
    fn empty_view_signals_no_data_everywhere() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            regions: ["Nowhere".to_string()].into_iter().collect::<BTreeSet<_>>(),
            ..FilterCriteria::default()
        };
        let view = apply_filters(&ds, &criteria);
        assert!(view.is_empty());

        assert!(matches!(
            aggregate_by(&view, &[Dimension::Category], Measure::Sales, GroupOrder::FirstSeen),
            Err(PipelineError::EmptyResult)
        ));
        assert!(matches!(
            monthly_time_series(&view, Measure::Sales),
            Err(PipelineError::EmptyResult)
        ));
        assert!(matches!(
            pivot(
                &view,
                Axis::Dimension(Dimension::SubCategory),
                Axis::Month,
                Measure::Sales,
                Aggregator::Sum,
                0.0
            ),
            Err(PipelineError::EmptyResult)
        ));
        assert!(matches!(scatter_points(&view), Err(PipelineError::EmptyResult)));
    }

    #[test]
    fn missing_field_is_reported_before_grouping() {
        let mut cols = full_columns();
        cols.retain(|c| c != "Sub-Category" && c != "Profit");
        let ds = Dataset::new(sample_dataset().records, cols);
        let view = FilteredView::full(&ds);

        match pivot(
            &view,
            Axis::Dimension(Dimension::SubCategory),
            Axis::Month,
            Measure::Sales,
            Aggregator::Sum,
            0.0,
        ) {
            Err(PipelineError::MissingColumn(name)) => assert_eq!(name, "Sub-Category"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
        assert!(matches!(
            scatter_points(&view),
            Err(PipelineError::MissingColumn(name)) if name == "Profit"
        ));
        assert!(aggregate_by(&view, &[Dimension::Region], Measure::Sales, GroupOrder::FirstSeen).is_ok());
    }

    #[test]
    fn blank_keys_are_not_grouped() {
        let mut ds = sample_dataset();
        ds.records[0].category.clear();
        ds.records[2].sub_category.clear();
        let view = FilteredView::full(&ds);

        let table =
            aggregate_by(&view, &[Dimension::Category], Measure::Sales, GroupOrder::FirstSeen)
                .unwrap();
        assert!(table.rows.iter().all(|r| !r.key[0].is_empty()));
        assert!(approx(table.get(&["Technology"]).unwrap(), 80.0));
        assert!(approx(table.total(), 968.5 - 300.0));

        let grid = pivot(
            &view,
            Axis::Dimension(Dimension::SubCategory),
            Axis::Month,
            Measure::Sales,
            Aggregator::Sum,
            0.0,
        )
        .unwrap();
        assert!(grid.rows.iter().all(|r| !r.label.is_empty()));
        assert_eq!(grid.get("Paper", "January"), None);
    }

    #[test]
    fn all_blank_keys_mean_no_data() {
        let mut ds = sample_dataset();
        ds.records.iter_mut().for_each(|r| r.segment.clear());
        let view = FilteredView::full(&ds);
        assert!(matches!(
            aggregate_by(&view, &[Dimension::Segment], Measure::Sales, GroupOrder::FirstSeen),
            Err(PipelineError::EmptyResult)
        ));
    }
}
