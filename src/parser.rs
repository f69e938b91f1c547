use crate::aliases::{HeaderAliasTable, HeaderMap};
use crate::coerce::coerce_field;
use crate::error::ParseError;
use crate::types::{AdRecord, Field, FieldValue, RawCell};
use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Diagnostics for one parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseReport {
    pub total_rows: usize,
    /// Rows where every cell was empty; skipped entirely.
    pub blank_rows: usize,
    pub records: usize,
    pub recognized_columns: Vec<String>,
    pub ignored_columns: Vec<String>,
    /// Records whose reporting start was missing or unreadable and were
    /// bucketed under the processing date instead.
    pub filled_dates: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDataset {
    pub records: Vec<AdRecord>,
    pub report: ParseReport,
}

/// Parse an export grid with the built-in alias table, using the current
/// local time for unusable reporting dates.
pub fn parse<R: AsRef<[RawCell]>>(
    header_row: &[RawCell],
    rows: &[R],
) -> Result<ParsedDataset, ParseError> {
    parse_with(
        HeaderAliasTable::builtin(),
        header_row,
        rows,
        Local::now().naive_local(),
    )
}

/// Parse an export grid.
///
/// Every non-blank row becomes exactly one record; incomplete rows are
/// defaulted, not rejected. Nothing is returned alongside an error.
pub fn parse_with<R: AsRef<[RawCell]>>(
    table: &HeaderAliasTable,
    header_row: &[RawCell],
    rows: &[R],
    now: NaiveDateTime,
) -> Result<ParsedDataset, ParseError> {
    if header_row.iter().all(RawCell::is_blank) {
        return Err(ParseError::EmptyHeader);
    }

    let headers: Vec<String> = header_row.iter().map(header_text).collect();
    let header_map = table.resolve(&headers);
    if header_map.is_empty() {
        return Err(ParseError::NoRecognizedColumns);
    }
    if !header_map.ignored.is_empty() {
        debug!("Ignoring unrecognized columns: {:?}", header_map.ignored);
    }

    let mut report = ParseReport {
        recognized_columns: header_map.columns.iter().map(|c| c.header.clone()).collect(),
        ignored_columns: header_map.ignored.clone(),
        ..ParseReport::default()
    };
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let row = row.as_ref();
        report.total_rows += 1;
        if row.iter().all(RawCell::is_blank) {
            report.blank_rows += 1;
            continue;
        }
        let record = AdRecord::from_values(row_values(&header_map, row), now);
        if record.date_filled {
            report.filled_dates += 1;
        }
        records.push(record);
    }

    if !records.iter().any(passes_sanity) {
        return Err(ParseError::NoValidRecords);
    }

    report.records = records.len();
    if report.filled_dates > 0 {
        warn!(
            "{} row(s) had no readable reporting start; grouped under {}",
            report.filled_dates,
            now.date()
        );
    }
    info!(
        "Parsed {} record(s) from {} row(s) using {} recognized column(s)",
        report.records,
        report.total_rows,
        report.recognized_columns.len()
    );
    Ok(ParsedDataset { records, report })
}

/// Coerce the mapped cells of one row. Cells past the end of a short row
/// count as empty; when two columns map to one field the later one wins.
fn row_values(header_map: &HeaderMap, row: &[RawCell]) -> BTreeMap<Field, FieldValue> {
    let empty = RawCell::Empty;
    header_map
        .columns
        .iter()
        .map(|col| {
            let cell = row.get(col.index).unwrap_or(&empty);
            (col.field, coerce_field(cell, col.field))
        })
        .collect()
}

fn passes_sanity(record: &AdRecord) -> bool {
    record.amount_spent_usd.is_finite()
        && !record.country.is_empty()
        && !record.campaign_name.is_empty()
}

fn header_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Text(s) => s.clone(),
        RawCell::Number(n) => n.to_string(),
        RawCell::Date(d) => d.format("%Y-%m-%d").to_string(),
        RawCell::Empty => String::new(),
    }
}
