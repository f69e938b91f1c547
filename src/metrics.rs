//! Derived ratio metrics.
//!
//! Ratios are never averaged across rows. Each group accumulates the raw
//! components below and every derived metric is computed from those sums
//! through one table, [`DERIVED_METRICS`].
use crate::types::{AdRecord, Field};
use crate::util::ratio_or_zero;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw measures that derived metrics are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Spend,
    Value,
    Impressions,
    LinkClicks,
    Results,
}

impl Component {
    pub fn field(self) -> Field {
        match self {
            Component::Spend => Field::AmountSpentUsd,
            Component::Value => Field::ValueSum,
            Component::Impressions => Field::Impressions,
            Component::LinkClicks => Field::LinkClicks,
            Component::Results => Field::Results,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivedMetric {
    #[serde(rename = "calculatedROAS")]
    Roas,
    #[serde(rename = "calculatedCTR")]
    Ctr,
    #[serde(rename = "calculatedCPM")]
    Cpm,
    #[serde(rename = "calculatedCPC")]
    Cpc,
    #[serde(rename = "calculatedCostPerResult")]
    CostPerResult,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricFormula {
    pub metric: DerivedMetric,
    pub numerator: Component,
    pub denominator: Component,
    pub scale: f64,
}

pub static DERIVED_METRICS: [MetricFormula; 5] = [
    MetricFormula {
        metric: DerivedMetric::Roas,
        numerator: Component::Value,
        denominator: Component::Spend,
        scale: 1.0,
    },
    MetricFormula {
        metric: DerivedMetric::Ctr,
        numerator: Component::LinkClicks,
        denominator: Component::Impressions,
        scale: 100.0,
    },
    MetricFormula {
        metric: DerivedMetric::Cpm,
        numerator: Component::Spend,
        denominator: Component::Impressions,
        scale: 1000.0,
    },
    MetricFormula {
        metric: DerivedMetric::Cpc,
        numerator: Component::Spend,
        denominator: Component::LinkClicks,
        scale: 1.0,
    },
    MetricFormula {
        metric: DerivedMetric::CostPerResult,
        numerator: Component::Spend,
        denominator: Component::Results,
        scale: 1.0,
    },
];

impl DerivedMetric {
    pub const ALL: [DerivedMetric; 5] = [
        DerivedMetric::Roas,
        DerivedMetric::Ctr,
        DerivedMetric::Cpm,
        DerivedMetric::Cpc,
        DerivedMetric::CostPerResult,
    ];

    /// Series identifier, e.g. `calculatedROAS`.
    pub fn id(self) -> &'static str {
        match self {
            DerivedMetric::Roas => "calculatedROAS",
            DerivedMetric::Ctr => "calculatedCTR",
            DerivedMetric::Cpm => "calculatedCPM",
            DerivedMetric::Cpc => "calculatedCPC",
            DerivedMetric::CostPerResult => "calculatedCostPerResult",
        }
    }

    pub fn formula(self) -> &'static MetricFormula {
        // The table holds exactly one row per variant, in declaration order.
        &DERIVED_METRICS[self as usize]
    }

    pub fn compute(self, sums: &ComponentSums) -> f64 {
        let formula = self.formula();
        ratio_or_zero(sums.get(formula.numerator), sums.get(formula.denominator), formula.scale)
    }
}

impl fmt::Display for DerivedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Running totals of every [`Component`] for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentSums {
    pub spend: f64,
    pub value: f64,
    pub impressions: f64,
    pub link_clicks: f64,
    pub results: f64,
}

impl ComponentSums {
    pub fn add(&mut self, record: &AdRecord) {
        self.spend += record.number_or_zero(Component::Spend.field());
        self.value += record.number_or_zero(Component::Value.field());
        self.impressions += record.number_or_zero(Component::Impressions.field());
        self.link_clicks += record.number_or_zero(Component::LinkClicks.field());
        self.results += record.number_or_zero(Component::Results.field());
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Spend => self.spend,
            Component::Value => self.value,
            Component::Impressions => self.impressions,
            Component::LinkClicks => self.link_clicks,
            Component::Results => self.results,
        }
    }
}
