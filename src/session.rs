use crate::aliases::HeaderAliasTable;
use crate::error::ParseError;
use crate::filter::FilterState;
use crate::parser::{parse_with, ParseReport, ParsedDataset};
use crate::reports::DatasetSummary;
use crate::types::{AdRecord, RawCell};
use chrono::{Local, NaiveDateTime};
use log::info;

/// The dataset currently on screen plus the active filters.
///
/// A load only replaces the dataset when it succeeds, so a bad file never
/// wipes out data that was already loaded.
#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<ParsedDataset>,
    summary: DatasetSummary,
    filters: FilterState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<R: AsRef<[RawCell]>>(
        &mut self,
        table: &HeaderAliasTable,
        header_row: &[RawCell],
        rows: &[R],
    ) -> Result<&ParseReport, ParseError> {
        self.load_at(table, header_row, rows, Local::now().naive_local())
    }

    pub fn load_at<R: AsRef<[RawCell]>>(
        &mut self,
        table: &HeaderAliasTable,
        header_row: &[RawCell],
        rows: &[R],
        now: NaiveDateTime,
    ) -> Result<&ParseReport, ParseError> {
        let parsed = parse_with(table, header_row, rows, now)?;
        self.summary = DatasetSummary::from_records(&parsed.records);
        info!(
            "Loaded {} record(s) across {} countr(ies) and {} campaign(s)",
            self.summary.total_records,
            self.summary.countries.len(),
            self.summary.campaigns.len()
        );
        let dataset = self.dataset.insert(parsed);
        self.filters = default_filters(&self.summary);
        Ok(&dataset.report)
    }

    pub fn has_data(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn records(&self) -> &[AdRecord] {
        match &self.dataset {
            Some(d) => &d.records,
            None => &[],
        }
    }

    pub fn report(&self) -> Option<&ParseReport> {
        self.dataset.as_ref().map(|d| &d.report)
    }

    pub fn summary(&self) -> &DatasetSummary {
        &self.summary
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    /// Back to the full date span with no country or campaign selection.
    pub fn clear_filters(&mut self) {
        self.filters = default_filters(&self.summary);
    }

    /// Records passing the active filters.
    pub fn selected(&self) -> Vec<&AdRecord> {
        self.filters.apply(self.records())
    }
}

fn default_filters(summary: &DatasetSummary) -> FilterState {
    FilterState {
        date_range: summary.min_date.zip(summary.max_date),
        ..FilterState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn cells(values: &[&str]) -> Vec<RawCell> {
        values.iter().map(|v| RawCell::from(*v)).collect()
    }

    fn load_sample(session: &mut Session) {
        let header = cells(&["Reporting Starts", "Country", "Campaign Name", "Amount Spent (USD)"]);
        let rows = vec![
            cells(&["2024-01-01", "UA", "A", "10"]),
            cells(&["2024-01-05", "PL", "B", "20"]),
        ];
        session
            .load_at(HeaderAliasTable::builtin(), &header, &rows, now())
            .expect("sample loads");
    }

    #[test]
    fn successful_load_seeds_date_filter() {
        let mut session = Session::new();
        load_sample(&mut session);
        assert!(session.has_data());
        let (start, end) = session.filters().date_range.unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(session.selected().len(), 2);
    }

    #[test]
    fn rows_with_unreadable_dates_stay_selected_after_load() {
        let mut session = Session::new();
        let header = cells(&["Reporting Starts", "Campaign Name", "Amount Spent (USD)"]);
        let rows = vec![
            cells(&["2024-01-01", "A", "10"]),
            cells(&["2024-01-05", "A", "20"]),
            cells(&["garbage", "B", "500"]),
        ];
        let report = session
            .load_at(HeaderAliasTable::builtin(), &header, &rows, now())
            .unwrap();
        assert_eq!(report.filled_dates, 1);
        assert_eq!(session.selected().len(), session.records().len());
        let (start, end) = session.filters().date_range.unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, now().date());
        let spend: f64 = session.selected().iter().map(|r| r.amount_spent_usd).sum();
        assert_eq!(spend, 530.0);
    }

    #[test]
    fn failed_load_keeps_previous_data() {
        let mut session = Session::new();
        load_sample(&mut session);
        let before = session.records().to_vec();

        let header = cells(&["Nothing", "Useful"]);
        let rows = vec![cells(&["x", "y"])];
        let err = session
            .load_at(HeaderAliasTable::builtin(), &header, &rows, now())
            .unwrap_err();
        assert_eq!(err, ParseError::NoRecognizedColumns);
        assert_eq!(session.records(), before.as_slice());
        assert_eq!(session.summary().total_records, 2);
    }

    #[test]
    fn filters_narrow_and_clear() {
        let mut session = Session::new();
        load_sample(&mut session);
        let mut filters = session.filters().clone();
        filters.countries = vec!["PL".into()];
        session.set_filters(filters);
        assert_eq!(session.selected().len(), 1);
        session.clear_filters();
        assert_eq!(session.selected().len(), 2);
    }

    #[test]
    fn empty_session_selects_nothing() {
        let session = Session::new();
        assert!(!session.has_data());
        assert!(session.selected().is_empty());
        assert!(session.report().is_none());
    }
}
