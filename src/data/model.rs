use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};

pub const ORDER_DATE: &str = "Order Date";

// ---------------------------------------------------------------------------
// Dimension / Measure – typed names for the columns we aggregate over
// ---------------------------------------------------------------------------

/// A categorical column of a sales record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Region,
    State,
    City,
    Category,
    SubCategory,
    Segment,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Region,
        Dimension::State,
        Dimension::City,
        Dimension::Category,
        Dimension::SubCategory,
        Dimension::Segment,
    ];

    /// Column header used in source files and exports.
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::State => "State",
            Dimension::City => "City",
            Dimension::Category => "Category",
            Dimension::SubCategory => "Sub-Category",
            Dimension::Segment => "Segment",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A numeric column of a sales record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Sales,
    Profit,
    Quantity,
}

impl Measure {
    pub fn column_name(self) -> &'static str {
        match self {
            Measure::Sales => "Sales",
            Measure::Profit => "Profit",
            Measure::Quantity => "Quantity",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Header of an exported record set, in field order.
pub const RECORD_COLUMNS: [&str; 10] = [
    ORDER_DATE,
    "Region",
    "State",
    "City",
    "Category",
    "Sub-Category",
    "Segment",
    "Sales",
    "Profit",
    "Quantity",
];

/// Columns a source must provide before anything else can run.
pub const REQUIRED_COLUMNS: [&str; 6] = [ORDER_DATE, "Region", "State", "City", "Category", "Sales"];

// ---------------------------------------------------------------------------
// Record – one row of the sales table
// ---------------------------------------------------------------------------

/// One sales transaction.
///
/// Serialises with the original column headers so a set of records can be
/// written straight back out as CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Order Date")]
    pub order_date: NaiveDate,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Sales")]
    pub sales: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
}

impl Record {
    pub fn dimension(&self, dim: Dimension) -> &str {
        match dim {
            Dimension::Region => &self.region,
            Dimension::State => &self.state,
            Dimension::City => &self.city,
            Dimension::Category => &self.category,
            Dimension::SubCategory => &self.sub_category,
            Dimension::Segment => &self.segment,
        }
    }

    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Sales => self.sales,
            Measure::Profit => self.profit,
            Measure::Quantity => self.quantity as f64,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records in source order.
    pub records: Vec<Record>,
    /// Trimmed column names of the source, in source order.
    pub column_names: Vec<String>,
    present: HashSet<String>,
}

impl Dataset {
    pub fn new(records: Vec<Record>, column_names: Vec<String>) -> Self {
        let present = column_names.iter().cloned().collect();
        Dataset {
            records,
            column_names,
            present,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.present.contains(name)
    }

    /// Fail with [`PipelineError::MissingColumn`] unless `name` was in the source.
    pub fn require_column(&self, name: &str) -> PipelineResult<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(PipelineError::MissingColumn(name.to_string()))
        }
    }

    /// Earliest and latest order date, used to seed the date filter.
    pub fn date_bounds(&self) -> PipelineResult<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().map(|r| r.order_date);
        let first = dates.next().ok_or(PipelineError::EmptyDataset)?;
        Ok(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Shorthand used across the data-layer tests.
    pub(crate) fn record(
        date: &str,
        region: &str,
        state: &str,
        city: &str,
        category: &str,
        sub_category: &str,
        sales: f64,
    ) -> Record {
        Record {
            order_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            region: region.to_string(),
            state: state.to_string(),
            city: city.to_string(),
            category: category.to_string(),
            sub_category: sub_category.to_string(),
            segment: "Consumer".to_string(),
            sales,
            profit: sales / 10.0,
            quantity: 2,
        }
    }

    pub(crate) fn full_columns() -> Vec<String> {
        RECORD_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    pub(crate) fn sample_dataset() -> Dataset {
        let records = vec![
            record("2021-11-03", "East", "New York", "New York City", "Technology", "Phones", 300.0),
            record("2021-12-15", "West", "California", "Los Angeles", "Furniture", "Chairs", 120.5),
            record("2022-01-07", "East", "New York", "Buffalo", "Office Supplies", "Paper", 15.25),
            record("2021-12-20", "West", "California", "San Francisco", "Technology", "Phones", 80.0),
            record("2022-01-30", "Central", "Texas", "Houston", "Furniture", "Tables", 410.0),
            record("2021-11-28", "East", "Pennsylvania", "Philadelphia", "Office Supplies", "Binders", 42.75),
        ];
        Dataset::new(records, full_columns())
    }

    #[test]
    fn date_bounds_scan_all_records() {
        let ds = sample_dataset();
        let (lo, hi) = ds.date_bounds().unwrap();
        assert_eq!(lo, NaiveDate::from_ymd_opt(2021, 11, 3).unwrap());
        assert_eq!(hi, NaiveDate::from_ymd_opt(2022, 1, 30).unwrap());
    }

    #[test]
    fn date_bounds_of_empty_dataset_is_explicit() {
        let ds = Dataset::new(Vec::new(), full_columns());
        assert!(matches!(ds.date_bounds(), Err(PipelineError::EmptyDataset)));
    }

    #[test]
    fn require_column_reports_missing_name() {
        let ds = Dataset::new(Vec::new(), vec![ORDER_DATE.to_string()]);
        match ds.require_column("Sub-Category") {
            Err(PipelineError::MissingColumn(name)) => assert_eq!(name, "Sub-Category"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
