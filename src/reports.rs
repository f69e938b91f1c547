use crate::aggregate::{aggregate_by_category, aggregate_by_date, AggregationMode};
use crate::metrics::DerivedMetric;
use crate::types::{AdRecord, AggregatePoint, Field};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Categorical charts only show the leading categories.
pub const CATEGORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    TimeSeries,
    Category,
}

/// A titled series ready for a chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    /// Metric ids plotted, in legend order.
    pub metrics: Vec<String>,
    pub points: Vec<AggregatePoint>,
}

struct TimeSeriesPreset {
    title: &'static str,
    raw: &'static [Field],
    derived: &'static [DerivedMetric],
}

struct CategoryPreset {
    title: &'static str,
    category: Field,
    value: Field,
    derived: Option<DerivedMetric>,
}

const TIME_SERIES: &[TimeSeriesPreset] = &[
    TimeSeriesPreset {
        title: "Spend Over Time",
        raw: &[Field::AmountSpentUsd],
        derived: &[],
    },
    TimeSeriesPreset {
        title: "Reach & Impressions Over Time",
        raw: &[Field::Reach, Field::Impressions],
        derived: &[],
    },
    TimeSeriesPreset {
        title: "Engagement Rates Over Time (CTR, CPM, CPC)",
        raw: &[],
        derived: &[DerivedMetric::Ctr, DerivedMetric::Cpm, DerivedMetric::Cpc],
    },
    TimeSeriesPreset {
        title: "Results & Cost Per Result Over Time",
        raw: &[Field::Results],
        derived: &[DerivedMetric::CostPerResult],
    },
    TimeSeriesPreset {
        title: "ROAS Over Time",
        raw: &[],
        derived: &[DerivedMetric::Roas],
    },
    TimeSeriesPreset {
        title: "App Installs & In-App Purchases Over Time",
        raw: &[Field::AppInstalls, Field::InAppPurchases],
        derived: &[],
    },
];

const CATEGORIES: &[CategoryPreset] = &[
    CategoryPreset {
        title: "Total Spend by Country",
        category: Field::Country,
        value: Field::AmountSpentUsd,
        derived: None,
    },
    CategoryPreset {
        title: "Total Results by Country",
        category: Field::Country,
        value: Field::Results,
        derived: None,
    },
    CategoryPreset {
        title: "Total Spend by Campaign",
        category: Field::CampaignName,
        value: Field::AmountSpentUsd,
        derived: None,
    },
    CategoryPreset {
        title: "Total Results by Campaign",
        category: Field::CampaignName,
        value: Field::Results,
        derived: None,
    },
    CategoryPreset {
        title: "ROAS by Campaign",
        category: Field::CampaignName,
        value: Field::AmountSpentUsd,
        derived: Some(DerivedMetric::Roas),
    },
    CategoryPreset {
        title: "CTR by Campaign",
        category: Field::CampaignName,
        value: Field::Impressions,
        derived: Some(DerivedMetric::Ctr),
    },
];

/// Build every dashboard chart over `records` (already filtered).
pub fn build_dashboard(records: &[&AdRecord]) -> Vec<Chart> {
    if records.is_empty() {
        return Vec::new();
    }
    let mut charts = Vec::with_capacity(TIME_SERIES.len() + CATEGORIES.len());

    for preset in TIME_SERIES {
        let metrics = preset
            .raw
            .iter()
            .map(|f| f.id().to_string())
            .chain(preset.derived.iter().map(|m| m.id().to_string()))
            .collect();
        charts.push(Chart {
            title: preset.title.to_string(),
            kind: ChartKind::TimeSeries,
            metrics,
            points: aggregate_by_date(records.iter().copied(), preset.raw, preset.derived),
        });
    }

    for preset in CATEGORIES {
        let mut points = aggregate_by_category(
            records.iter().copied(),
            preset.category,
            preset.value,
            AggregationMode::Sum,
            preset.derived,
        );
        points.truncate(CATEGORY_LIMIT);
        let metric = preset
            .derived
            .map_or_else(|| preset.value.id(), DerivedMetric::id);
        charts.push(Chart {
            title: preset.title.to_string(),
            kind: ChartKind::Category,
            metrics: vec![metric.to_string()],
            points,
        });
    }
    charts
}

/// Overview of a loaded dataset, used to seed the filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub countries: Vec<String>,
    pub campaigns: Vec<String>,
    /// Bounds over every record, including ones dated to the processing day.
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub total_spend: f64,
}

impl DatasetSummary {
    pub fn from_records(records: &[AdRecord]) -> Self {
        let countries: BTreeSet<&str> = records.iter().map(|r| r.country.as_str()).collect();
        let campaigns: BTreeSet<&str> = records.iter().map(|r| r.campaign_name.as_str()).collect();
        let (min_date, max_date) = records
            .iter()
            .map(AdRecord::date)
            .fold((None, None), |(lo, hi), d| {
                (
                    Some(lo.map_or(d, |lo: NaiveDate| lo.min(d))),
                    Some(hi.map_or(d, |hi: NaiveDate| hi.max(d))),
                )
            });
        DatasetSummary {
            total_records: records.len(),
            countries: countries.into_iter().map(str::to_string).collect(),
            campaigns: campaigns.into_iter().map(str::to_string).collect(),
            min_date,
            max_date,
            total_spend: records.iter().map(|r| r.amount_spent_usd).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use std::collections::BTreeMap;

    fn record(day: u32, campaign: &str, spend: f64, filled: bool) -> AdRecord {
        let at = NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut values = BTreeMap::new();
        if !filled {
            values.insert(Field::ReportingStart, FieldValue::Date(Some(at)));
        }
        values.insert(Field::CampaignName, FieldValue::Text(campaign.into()));
        values.insert(Field::AmountSpentUsd, FieldValue::Number(spend));
        AdRecord::from_values(values, at)
    }

    #[test]
    fn dashboard_has_every_preset() {
        let recs = vec![record(1, "A", 10.0, false), record(2, "B", 20.0, false)];
        let refs: Vec<&AdRecord> = recs.iter().collect();
        let charts = build_dashboard(&refs);
        assert_eq!(charts.len(), TIME_SERIES.len() + CATEGORIES.len());
        let roas = charts.iter().find(|c| c.title == "ROAS by Campaign").unwrap();
        assert_eq!(roas.metrics, vec!["calculatedROAS".to_string()]);
        let spend = &charts[0];
        assert_eq!(spend.kind, ChartKind::TimeSeries);
        assert_eq!(spend.points.len(), 2);
    }

    #[test]
    fn category_charts_keep_top_ten() {
        let recs: Vec<AdRecord> = (1..=12)
            .map(|i| record(1, &format!("C{i}"), i as f64, false))
            .collect();
        let refs: Vec<&AdRecord> = recs.iter().collect();
        let charts = build_dashboard(&refs);
        let by_campaign = charts
            .iter()
            .find(|c| c.title == "Total Spend by Campaign")
            .unwrap();
        assert_eq!(by_campaign.points.len(), CATEGORY_LIMIT);
        assert_eq!(by_campaign.points[0].name, "C12");
    }

    #[test]
    fn empty_selection_builds_nothing() {
        assert!(build_dashboard(&[]).is_empty());
    }

    #[test]
    fn summary_bounds_cover_filled_dates() {
        let recs = vec![
            record(3, "B", 1.0, false),
            record(1, "A", 2.0, false),
            record(28, "A", 3.0, true),
        ];
        let summary = DatasetSummary::from_records(&recs);
        assert_eq!(summary.campaigns, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(summary.countries, vec!["Unknown".to_string()]);
        assert_eq!(summary.min_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(summary.max_date, NaiveDate::from_ymd_opt(2024, 2, 28));
        assert_eq!(summary.total_spend, 6.0);
    }
}
