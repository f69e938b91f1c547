//! Normalize ad performance exports with locale-dependent headers into
//! canonical records and aggregate them into chart-ready series.
//!
//! Pipeline: [`loader`] (file to raw grid) → [`parser`] (grid to records,
//! using [`aliases`] and [`coerce`]) → [`filter`] → [`aggregate`] (records
//! to points, ratios via [`metrics`]) → [`reports`] / [`output`].
pub mod aggregate;
pub mod aliases;
pub mod coerce;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod parser;
pub mod reports;
pub mod session;
pub mod types;
pub mod util;

pub use aggregate::{aggregate_by_category, aggregate_by_date, AggregationMode};
pub use aliases::{resolve, HeaderAliasTable, HeaderMap};
pub use coerce::coerce;
pub use error::{AppError, ParseError};
pub use metrics::DerivedMetric;
pub use parser::{parse, parse_with, ParseReport, ParsedDataset};
pub use types::{AdRecord, AggregatePoint, Field, FieldKind, FieldValue, RawCell};
