// Cell coercion: every malformed value in an export is absorbed here.
//
// `coerce` never fails. Unreadable numbers become 0, unreadable dates become
// the unset marker (`FieldValue::Date(None)`) and text is trimmed.
use crate::types::{Field, FieldKind, FieldValue, RawCell};
use crate::util::parse_number_text;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

// Last serial representable in the spreadsheet format (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Coerce one raw cell into the typed value for a field of `kind`.
pub fn coerce(raw: &RawCell, kind: FieldKind) -> FieldValue {
    if raw.is_blank() {
        return empty_value(kind);
    }
    match kind {
        FieldKind::Date => FieldValue::Date(coerce_date(raw)),
        FieldKind::Percentage => FieldValue::Number(coerce_percentage(raw)),
        FieldKind::Number => FieldValue::Number(coerce_number(raw)),
        FieldKind::Text => FieldValue::Text(coerce_text(raw)),
    }
}

/// [`coerce`] using the kind of a canonical field.
pub fn coerce_field(raw: &RawCell, field: Field) -> FieldValue {
    coerce(raw, field.kind())
}

/// What an empty cell turns into.
pub fn empty_value(kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Date => FieldValue::Date(None),
        FieldKind::Number | FieldKind::Percentage => FieldValue::Number(0.0),
        FieldKind::Text => FieldValue::Text(String::new()),
    }
}

fn coerce_date(raw: &RawCell) -> Option<NaiveDateTime> {
    match raw {
        RawCell::Number(serial) => from_spreadsheet_serial(*serial),
        RawCell::Date(d) => Some(*d),
        RawCell::Text(s) => parse_calendar_text(s),
        RawCell::Empty => None,
    }
}

fn coerce_number(raw: &RawCell) -> f64 {
    match raw {
        RawCell::Number(n) if n.is_finite() => *n,
        RawCell::Text(s) => parse_number_text(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn coerce_percentage(raw: &RawCell) -> f64 {
    if let RawCell::Text(s) = raw {
        if let Some(stripped) = s.trim().strip_suffix('%') {
            return parse_number_text(stripped).map(|n| n / 100.0).unwrap_or(0.0);
        }
    }
    coerce_number(raw)
}

fn coerce_text(raw: &RawCell) -> String {
    match raw {
        RawCell::Text(s) => s.trim().to_string(),
        RawCell::Number(n) => n.to_string(),
        RawCell::Date(d) => d.format("%Y-%m-%dT%H:%M:%S").to_string(),
        RawCell::Empty => String::new(),
    }
}

/// Convert a spreadsheet date serial (days since 1899-12-30, fraction is the
/// time of day) to a date-time.
///
/// The format counts a 29 February 1900 that never existed, so serials below
/// 60 are one day later than the plain epoch arithmetic gives and serial 60
/// itself is read as 28 February.
pub fn from_spreadsheet_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let whole = serial.trunc();
    let days = whole as i64;
    let date = match days {
        0..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_signed(Duration::days(days))?,
        60 => NaiveDate::from_ymd_opt(1900, 2, 28)?,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(days))?,
    };
    let seconds = ((serial - whole) * 86_400.0).round() as i64;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Best-effort parse of a calendar string in the shapes exports use.
pub fn parse_calendar_text(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
