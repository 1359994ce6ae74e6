use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use super::aggregate::{Axis, PivotTable, SummaryTable, TimeSeries};
use super::error::PipelineResult;
use super::model::{Record, RECORD_COLUMNS};

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Anything the dashboard offers as a download.
pub trait CsvExport {
    /// Suggested file name for the save dialog.
    fn file_name(&self) -> &str;

    /// Encode as UTF-8 CSV with a header row.
    fn to_csv(&self) -> PipelineResult<Vec<u8>>;

    fn write_csv(&self, path: &Path) -> PipelineResult<()> {
        std::fs::write(path, self.to_csv()?)?;
        log::info!("Exported {} to {}", self.file_name(), path.display());
        Ok(())
    }
}

fn writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

fn finish(w: csv::Writer<Vec<u8>>) -> PipelineResult<Vec<u8>> {
    w.into_inner()
        .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()).into())
}

/// A summary table paired with its download name.
pub struct NamedSummary<'a> {
    pub name: &'a str,
    pub table: &'a SummaryTable,
}

impl CsvExport for NamedSummary<'_> {
    fn file_name(&self) -> &str {
        self.name
    }

    fn to_csv(&self) -> PipelineResult<Vec<u8>> {
        let mut w = writer();
        w.write_record(self.table.header())?;
        for row in &self.table.rows {
            let value = row.value.to_string();
            w.write_record(row.key.iter().map(String::as_str).chain([value.as_str()]))?;
        }
        finish(w)
    }
}

impl CsvExport for TimeSeries {
    fn file_name(&self) -> &str {
        "TimeSeries.csv"
    }

    fn to_csv(&self) -> PipelineResult<Vec<u8>> {
        let mut w = writer();
        w.write_record([TimeSeries::LABEL_COLUMN, self.value_column.column_name()])?;
        for bucket in &self.buckets {
            w.write_record([bucket.label(), bucket.value.to_string()])?;
        }
        finish(w)
    }
}

impl CsvExport for PivotTable {
    fn file_name(&self) -> &str {
        match self.column_axis {
            Axis::Year => "Year_SubCategory_Sales.csv",
            _ => "Month_SubCategory_Sales.csv",
        }
    }

    /// Header is the row axis name followed by every column label.
    fn to_csv(&self) -> PipelineResult<Vec<u8>> {
        let mut w = writer();
        w.write_record(
            std::iter::once(self.row_axis.name()).chain(self.columns.iter().map(String::as_str)),
        )?;
        for row in &self.rows {
            let mut fields = vec![row.label.clone()];
            fields.extend(row.cells.iter().map(|v| v.to_string()));
            w.write_record(&fields)?;
        }
        finish(w)
    }
}

/// A set of raw records (the whole dataset or the filtered rows).
pub struct RecordSet<'a> {
    pub name: &'a str,
    pub records: Vec<&'a Record>,
}

impl CsvExport for RecordSet<'_> {
    fn file_name(&self) -> &str {
        self.name
    }

    fn to_csv(&self) -> PipelineResult<Vec<u8>> {
        let mut w = writer();
        // serde only emits the header alongside the first record.
        if self.records.is_empty() {
            w.write_record(RECORD_COLUMNS)?;
        }
        for record in &self.records {
            w.serialize(record)?;
        }
        finish(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{aggregate_by, monthly_time_series, pivot, Aggregator, GroupOrder};
    use crate::data::filter::FilteredView;
    use crate::data::model::tests::{record, sample_dataset};
    use crate::data::model::{Dimension, Measure};

    fn parse(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader.headers().unwrap().iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn summary_round_trips_through_csv() {
        let ds = sample_dataset();
        let view = FilteredView::full(&ds);
        let table = aggregate_by(
            &view,
            &[Dimension::Region, Dimension::Category],
            Measure::Sales,
            GroupOrder::FirstSeen,
        )
        .unwrap();
        let bytes = NamedSummary { name: "Region.csv", table: &table }.to_csv().unwrap();

        let (headers, rows) = parse(&bytes);
        assert_eq!(headers, vec!["Region", "Category", "Sales"]);
        assert_eq!(rows.len(), table.rows.len());
        for (parsed, row) in rows.iter().zip(&table.rows) {
            assert_eq!(&parsed[..2], row.key.as_slice());
            assert_eq!(parsed[2].parse::<f64>().unwrap(), row.value);
        }
    }

    #[test]
    fn embedded_commas_are_quoted_only_when_needed() {
        let ds = crate::data::model::Dataset::new(
            vec![record("2021-01-01", "East", "NY", "NYC", "Tables, Large", "T", 1.5)],
            crate::data::model::tests::full_columns(),
        );
        let table = aggregate_by(
            &FilteredView::full(&ds),
            &[Dimension::Category],
            Measure::Sales,
            GroupOrder::FirstSeen,
        )
        .unwrap();
        let bytes = NamedSummary { name: "Category.csv", table: &table }.to_csv().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Category,Sales\n\"Tables, Large\",1.5\n");
    }

    #[test]
    fn time_series_export_keeps_chronological_labels() {
        let ds = sample_dataset();
        let series = monthly_time_series(&FilteredView::full(&ds), Measure::Sales).unwrap();
        let (headers, rows) = parse(&series.to_csv().unwrap());
        assert_eq!(headers, vec!["month_year", "Sales"]);
        let labels: Vec<_> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(labels, vec!["2021-Nov", "2021-Dec", "2022-Jan"]);
    }

    #[test]
    fn pivot_export_has_row_axis_header() {
        let ds = sample_dataset();
        let table = pivot(
            &FilteredView::full(&ds),
            Axis::Dimension(Dimension::SubCategory),
            Axis::Month,
            Measure::Sales,
            Aggregator::Sum,
            0.0,
        )
        .unwrap();
        assert_eq!(table.file_name(), "Month_SubCategory_Sales.csv");
        let (headers, rows) = parse(&table.to_csv().unwrap());
        assert_eq!(headers, vec!["Sub-Category", "January", "November", "December"]);
        assert_eq!(rows.len(), table.rows.len());
        assert!(rows.iter().all(|r| r.len() == headers.len()));
    }

    #[test]
    fn records_export_uses_source_headers() {
        let ds = sample_dataset();
        let set = RecordSet {
            name: "Original_Dataset.csv",
            records: ds.records.iter().collect(),
        };
        let bytes = set.to_csv().unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers[0], "Order Date");
        assert_eq!(headers[5], "Sub-Category");
        let back: Vec<Record> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(back, ds.records);
    }

    #[test]
    fn empty_record_set_still_has_header() {
        let set = RecordSet {
            name: "Filtered_Data.csv",
            records: Vec::new(),
        };
        let (headers, rows) = parse(&set.to_csv().unwrap());
        assert_eq!(headers, RECORD_COLUMNS);
        assert!(rows.is_empty());
    }
}
