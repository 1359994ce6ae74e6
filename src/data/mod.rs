/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (typed records, trimmed headers)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date → region → state → city cascade → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group-by sums, monthly series, pivot, scatter
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ dashboard  │  all panels for one selection   ──► export (CSV)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
