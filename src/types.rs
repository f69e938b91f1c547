use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// How a canonical field's raw cells are coerced and aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Date,
    Number,
    Percentage,
    Text,
}

/// Canonical column of an ad performance export, independent of the
/// locale or spelling of the header it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    // Identifiers and dates
    ReportingStart,
    ReportingEnd,
    CampaignName,
    AdSetName,
    AdName,
    Country,
    // Delivery and budget
    AdSetDelivery,
    AdSetBudget,
    BudgetType,
    // Core performance
    AmountSpentUsd,
    Reach,
    Impressions,
    LinkClicks,
    // Results
    Results,
    ResultIndicator,
    CostPerResult,
    ValueSum,
    TotalRoas,
    // Engagement
    Cpm,
    CtrAll,
    CpcAll,
    // App
    AppInstalls,
    InAppPurchases,
    InAppPurchasesConversionValue,
    CostPerInAppPurchase,
    // Video funnel
    VideoPlays3Sec,
    VideoPlaysTo25Percent,
    VideoPlaysTo50Percent,
    VideoPlaysTo75Percent,
    VideoPlaysTo95Percent,
    VideoPlaysTo100Percent,
    CostPer3SecVideoPlay,
    // Other
    Frequency,
    UniqueLinkClicks,
}

impl Field {
    pub const ALL: [Field; 34] = [
        Field::ReportingStart,
        Field::ReportingEnd,
        Field::CampaignName,
        Field::AdSetName,
        Field::AdName,
        Field::Country,
        Field::AdSetDelivery,
        Field::AdSetBudget,
        Field::BudgetType,
        Field::AmountSpentUsd,
        Field::Reach,
        Field::Impressions,
        Field::LinkClicks,
        Field::Results,
        Field::ResultIndicator,
        Field::CostPerResult,
        Field::ValueSum,
        Field::TotalRoas,
        Field::Cpm,
        Field::CtrAll,
        Field::CpcAll,
        Field::AppInstalls,
        Field::InAppPurchases,
        Field::InAppPurchasesConversionValue,
        Field::CostPerInAppPurchase,
        Field::VideoPlays3Sec,
        Field::VideoPlaysTo25Percent,
        Field::VideoPlaysTo50Percent,
        Field::VideoPlaysTo75Percent,
        Field::VideoPlaysTo95Percent,
        Field::VideoPlaysTo100Percent,
        Field::CostPer3SecVideoPlay,
        Field::Frequency,
        Field::UniqueLinkClicks,
    ];

    /// Stable identifier used in alias files, JSON exports and chart series.
    pub fn id(self) -> &'static str {
        match self {
            Field::ReportingStart => "reportingStart",
            Field::ReportingEnd => "reportingEnd",
            Field::CampaignName => "campaignName",
            Field::AdSetName => "adSetName",
            Field::AdName => "adName",
            Field::Country => "country",
            Field::AdSetDelivery => "adSetDelivery",
            Field::AdSetBudget => "adSetBudget",
            Field::BudgetType => "budgetType",
            Field::AmountSpentUsd => "amountSpentUSD",
            Field::Reach => "reach",
            Field::Impressions => "impressions",
            Field::LinkClicks => "linkClicks",
            Field::Results => "results",
            Field::ResultIndicator => "resultIndicator",
            Field::CostPerResult => "costPerResult",
            Field::ValueSum => "valueSum",
            Field::TotalRoas => "totalROAS",
            Field::Cpm => "cpm",
            Field::CtrAll => "ctrAll",
            Field::CpcAll => "cpcAll",
            Field::AppInstalls => "appInstalls",
            Field::InAppPurchases => "inAppPurchases",
            Field::InAppPurchasesConversionValue => "inAppPurchasesConversionValue",
            Field::CostPerInAppPurchase => "costPerInAppPurchase",
            Field::VideoPlays3Sec => "videoPlays3Sec",
            Field::VideoPlaysTo25Percent => "videoPlaysTo25Percent",
            Field::VideoPlaysTo50Percent => "videoPlaysTo50Percent",
            Field::VideoPlaysTo75Percent => "videoPlaysTo75Percent",
            Field::VideoPlaysTo95Percent => "videoPlaysTo95Percent",
            Field::VideoPlaysTo100Percent => "videoPlaysTo100Percent",
            Field::CostPer3SecVideoPlay => "costPer3SecVideoPlay",
            Field::Frequency => "frequency",
            Field::UniqueLinkClicks => "uniqueLinkClicks",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::ReportingStart | Field::ReportingEnd => FieldKind::Date,
            Field::CtrAll => FieldKind::Percentage,
            Field::CampaignName
            | Field::AdSetName
            | Field::AdName
            | Field::Country
            | Field::AdSetDelivery
            | Field::BudgetType
            | Field::ResultIndicator => FieldKind::Text,
            _ => FieldKind::Number,
        }
    }

    pub fn from_id(id: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.id() == id)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// Serialized by identifier so fields can key JSON maps and alias files.
impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Field::from_id(&id)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown field identifier '{}'", id)))
    }
}

/// A raw spreadsheet cell as handed over by whatever read the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl RawCell {
    /// `true` for absent cells and text that trims to nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(_) | RawCell::Date(_) => false,
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<String> for RawCell {
    fn from(s: String) -> Self {
        RawCell::Text(s)
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

impl From<NaiveDateTime> for RawCell {
    fn from(d: NaiveDateTime) -> Self {
        RawCell::Date(d)
    }
}

/// A coerced cell. `Date(None)` is the "unset" marker for unparseable dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Date(Option<NaiveDateTime>),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(d) => *d,
            _ => None,
        }
    }
}

pub const UNKNOWN_COUNTRY: &str = "Unknown";
pub const UNKNOWN_CAMPAIGN: &str = "Unknown Campaign";

/// One normalized export row.
///
/// The six required fields are always populated (defaults are applied when
/// the source lacks them); every other field is absent unless its column was
/// present in the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdRecord {
    pub reporting_start: NaiveDateTime,
    /// Calendar day of `reporting_start` as `YYYY-MM-DD`; the grouping key
    /// for time series.
    pub date_key: String,
    /// Set when the source had no usable reporting start and the processing
    /// date was used instead.
    pub date_filled: bool,
    pub campaign_name: String,
    pub country: String,
    #[serde(rename = "amountSpentUSD")]
    pub amount_spent_usd: f64,
    pub reach: f64,
    pub impressions: f64,
    #[serde(flatten)]
    optional: BTreeMap<Field, FieldValue>,
}

impl AdRecord {
    /// Build a record from the coerced cells of one row.
    ///
    /// Required fields missing from `values` (or holding an empty / unset
    /// value) get their defaults; `now` stands in for an unusable
    /// reporting start.
    pub fn from_values(mut values: BTreeMap<Field, FieldValue>, now: NaiveDateTime) -> Self {
        let parsed_start = values
            .remove(&Field::ReportingStart)
            .and_then(|v| v.as_date());
        let date_filled = parsed_start.is_none();
        let reporting_start = parsed_start.unwrap_or(now);

        let amount_spent_usd = take_number(&mut values, Field::AmountSpentUsd);
        let reach = take_number(&mut values, Field::Reach);
        let impressions = take_number(&mut values, Field::Impressions);
        let country = take_text(&mut values, Field::Country, UNKNOWN_COUNTRY);
        let campaign_name = take_text(&mut values, Field::CampaignName, UNKNOWN_CAMPAIGN);

        AdRecord {
            date_key: day_key(reporting_start.date()),
            reporting_start,
            date_filled,
            campaign_name,
            country,
            amount_spent_usd,
            reach,
            impressions,
            optional: values,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.reporting_start.date()
    }

    /// Numeric value of `field`; `None` for absent or non-numeric fields.
    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::AmountSpentUsd => Some(self.amount_spent_usd),
            Field::Reach => Some(self.reach),
            Field::Impressions => Some(self.impressions),
            _ => self.optional.get(&field).and_then(FieldValue::as_number),
        }
    }

    /// Like [`AdRecord::number`], but absent or non-finite values read as 0.
    pub fn number_or_zero(&self, field: Field) -> f64 {
        self.number(field).filter(|n| n.is_finite()).unwrap_or(0.0)
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::CampaignName => Some(self.campaign_name.as_str()),
            Field::Country => Some(self.country.as_str()),
            _ => self.optional.get(&field).and_then(FieldValue::as_text),
        }
    }

    pub fn datetime(&self, field: Field) -> Option<NaiveDateTime> {
        match field {
            Field::ReportingStart => Some(self.reporting_start),
            _ => self.optional.get(&field).and_then(FieldValue::as_date),
        }
    }

    /// String form of `field` for use as a category label, or `None` when
    /// the field is absent or empty.
    pub fn label(&self, field: Field) -> Option<String> {
        if field == Field::ReportingStart {
            return Some(self.date_key.clone());
        }
        let label = match field.kind() {
            FieldKind::Text => self.text(field).map(str::to_string),
            FieldKind::Number | FieldKind::Percentage => self.number(field).map(|n| n.to_string()),
            FieldKind::Date => self.datetime(field).map(|d| day_key(d.date())),
        };
        label.filter(|s| !s.is_empty())
    }

    /// Optional fields actually present on this record.
    pub fn optional_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.optional.keys().copied()
    }
}

fn take_number(values: &mut BTreeMap<Field, FieldValue>, field: Field) -> f64 {
    values
        .remove(&field)
        .and_then(|v| v.as_number())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn take_text(values: &mut BTreeMap<Field, FieldValue>, field: Field, default: &str) -> String {
    match values.remove(&field) {
        Some(FieldValue::Text(s)) if !s.is_empty() => s,
        _ => default.to_string(),
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One chart-ready point: a grouping key plus metric id to value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatePoint {
    pub name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl AggregatePoint {
    pub fn new(name: impl Into<String>) -> Self {
        AggregatePoint {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}
