use thiserror::Error;

/// Everything that can go wrong between reading a source file and handing a
/// derived table to the UI.
///
/// The first three kinds are the user-facing conditions the dashboard must
/// show instead of a chart; the rest wrap IO and decoding failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to parse '{column}' at row {row}: '{value}' is not a recognised date")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column '{0}' is missing from the dataset")]
    MissingColumn(String),

    #[error("no data available for the selected filters")]
    EmptyResult,

    #[error("the dataset contains no rows")]
    EmptyDataset,

    #[error("failed to parse '{column}' at row {row}: '{value}' is not a number")]
    NumberParse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("invalid JSON layout: {0}")]
    JsonLayout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

impl PipelineError {
    /// "Nothing to show" conditions, rendered as a warning rather than an error.
    pub fn is_no_data(&self) -> bool {
        matches!(self, PipelineError::EmptyResult | PipelineError::EmptyDataset)
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
