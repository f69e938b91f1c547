use ads_dashboard::aliases::DEFAULT_ALIASES;
use ads_dashboard::loader::read_grid_from;
use ads_dashboard::types::{UNKNOWN_CAMPAIGN, UNKNOWN_COUNTRY};
use ads_dashboard::{
    coerce, parse, parse_with, resolve, Field, FieldKind, FieldValue, HeaderAliasTable,
    ParseError, RawCell,
};
use chrono::{NaiveDate, NaiveDateTime};

fn cells(values: &[&str]) -> Vec<RawCell> {
    values.iter().map(|v| RawCell::from(*v)).collect()
}

fn processing_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 10)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

#[test]
fn every_alias_resolves_case_and_whitespace_insensitively() {
    for (alias, field) in DEFAULT_ALIASES {
        for variant in [alias.to_string(), format!(" {} ", alias.to_uppercase())] {
            let map = resolve(&[variant.as_str(), "unrelated"]);
            assert_eq!(map.field_for(&variant), Some(*field), "{variant:?}");
        }
    }
    let map = resolve(&[" Country ", "country"]);
    assert_eq!(map.field_for(" Country "), Some(Field::Country));
    assert_eq!(map.field_for("country"), Some(Field::Country));
}

#[test]
fn coercion_examples() {
    assert_eq!(coerce(&"1,234.50".into(), FieldKind::Number), FieldValue::Number(1234.5));
    let pct = coerce(&"5.5%".into(), FieldKind::Percentage).as_number().unwrap();
    assert!((pct - 0.055).abs() < 1e-12);
    assert_eq!(coerce(&"".into(), FieldKind::Number), FieldValue::Number(0.0));
    assert_eq!(coerce(&RawCell::Empty, FieldKind::Date), FieldValue::Date(None));
}

#[test]
fn unknown_column_is_dropped_and_spend_is_parsed() {
    let header = cells(&["Campaign Name", "Amount Spent (USD)", "Unknown Column"]);
    let rows = vec![cells(&["Camp A", "1,000", "x"])];
    let parsed = parse(&header, &rows).unwrap();
    assert_eq!(parsed.records.len(), 1);
    let rec = &parsed.records[0];
    assert_eq!(rec.campaign_name, "Camp A");
    assert_eq!(rec.amount_spent_usd, 1000.0);
    assert_eq!(rec.optional_fields().count(), 0);
    assert_eq!(parsed.report.ignored_columns, vec!["Unknown Column".to_string()]);
}

#[test]
fn valid_header_without_rows_has_no_valid_records() {
    let header = cells(&["Campaign Name", "Amount Spent (USD)"]);
    let rows: Vec<Vec<RawCell>> = Vec::new();
    assert_eq!(parse(&header, &rows), Err(ParseError::NoValidRecords));
}

#[test]
fn error_kinds_are_distinct_and_readable() {
    let rows = vec![cells(&["a"])];
    assert_eq!(parse(&[], &rows), Err(ParseError::EmptyHeader));
    assert_eq!(parse(&cells(&["a"]), &rows), Err(ParseError::NoRecognizedColumns));
    assert!(ParseError::NoRecognizedColumns
        .to_string()
        .contains("Campaign Name"));
    assert!(ParseError::EmptyHeader.to_string().contains("header"));
}

#[test]
fn required_fields_default_when_absent() {
    let header = cells(&["Ad Name"]);
    let rows = vec![cells(&["Creative 1"])];
    let parsed = parse_with(HeaderAliasTable::builtin(), &header, &rows, processing_time()).unwrap();
    let rec = &parsed.records[0];
    assert_eq!(rec.country, UNKNOWN_COUNTRY);
    assert_eq!(rec.campaign_name, UNKNOWN_CAMPAIGN);
    assert_eq!(rec.amount_spent_usd, 0.0);
    assert_eq!(rec.reach, 0.0);
    assert_eq!(rec.impressions, 0.0);
    assert_eq!(rec.date_key, "2024-04-10");
    assert!(rec.date_filled);
    assert_eq!(parsed.report.filled_dates, 1);
    assert_eq!(rec.text(Field::AdName), Some("Creative 1"));
}

#[test]
fn ukrainian_export_parses_like_english() {
    let csv = "\
Дата початку звіту,Назва кампанії,Країна,Витрачена сума (USD),Покази,Кліки за посиланням,CTR (усі)
2024-02-01,Весна,UA,\"1,250.75\",\"10,000\",150,1.5%
";
    let grid = read_grid_from(csv.as_bytes(), b',').unwrap();
    let parsed = parse_with(
        HeaderAliasTable::builtin(),
        &grid.header,
        &grid.rows,
        processing_time(),
    )
    .unwrap();
    let rec = &parsed.records[0];
    assert_eq!(rec.date_key, "2024-02-01");
    assert_eq!(rec.campaign_name, "Весна");
    assert_eq!(rec.country, "UA");
    assert_eq!(rec.amount_spent_usd, 1250.75);
    assert_eq!(rec.impressions, 10_000.0);
    assert_eq!(rec.number(Field::LinkClicks), Some(150.0));
    assert!((rec.number(Field::CtrAll).unwrap() - 0.015).abs() < 1e-12);
    assert_eq!(parsed.report.recognized_columns.len(), 7);
}

#[test]
fn custom_aliases_extend_recognition() {
    let extra = HeaderAliasTable::from_json_str(r#"{"Gasto": "amountSpentUSD"}"#).unwrap();
    let table = HeaderAliasTable::builtin().with_overrides(&extra);
    let header = cells(&["gasto"]);
    let rows = vec![cells(&["12.5"])];
    assert_eq!(
        parse_with(HeaderAliasTable::builtin(), &header, &rows, processing_time()),
        Err(ParseError::NoRecognizedColumns)
    );
    let parsed = parse_with(&table, &header, &rows, processing_time()).unwrap();
    assert_eq!(parsed.records[0].amount_spent_usd, 12.5);
}

#[test]
fn records_serialize_with_canonical_ids() {
    let header = cells(&["Reporting Starts", "Amount Spent (USD)", "Results"]);
    let rows = vec![cells(&["2024-01-01", "5", "2"])];
    let parsed = parse_with(HeaderAliasTable::builtin(), &header, &rows, processing_time()).unwrap();
    let json = serde_json::to_value(&parsed.records[0]).unwrap();
    assert_eq!(json["amountSpentUSD"], 5.0);
    assert_eq!(json["results"], 2.0);
    assert_eq!(json["dateKey"], "2024-01-01");
    assert_eq!(json["country"], "Unknown");
}
