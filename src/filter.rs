use crate::types::AdRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Record selection applied before aggregation. Empty sets select
/// everything; the date range is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub countries: Vec<String>,
    pub campaigns: Vec<String>,
}

impl FilterState {
    pub fn matches(&self, record: &AdRecord) -> bool {
        if let Some((start, end)) = self.date_range {
            let day = record.date();
            if day < start || day > end {
                return false;
            }
        }
        if !self.countries.is_empty() && !self.countries.contains(&record.country) {
            return false;
        }
        if !self.campaigns.is_empty() && !self.campaigns.contains(&record.campaign_name) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, records: &'a [AdRecord]) -> Vec<&'a AdRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.countries.is_empty() && self.campaigns.is_empty()
    }
}
