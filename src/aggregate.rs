//! Grouping records into chart-ready points.
//!
//! Both entry points are pure: they read the records, build fresh points and
//! keep no state between calls. Derived ratios always come from the
//! group's summed components via [`DerivedMetric::compute`].
use crate::metrics::{ComponentSums, DerivedMetric};
use crate::types::{AdRecord, AggregatePoint, Field};
use crate::util::{finite_or_zero, parse_day_key};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Label for records whose category field is absent or empty.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationMode {
    #[default]
    Sum,
    Average,
}

/// One point per distinct `date_key`, ascending by calendar date.
///
/// Each point carries the sum of every field in `raw_metrics` and the value
/// of every metric in `derived`.
pub fn aggregate_by_date<'a, I>(
    records: I,
    raw_metrics: &[Field],
    derived: &[DerivedMetric],
) -> Vec<AggregatePoint>
where
    I: IntoIterator<Item = &'a AdRecord>,
{
    struct Acc {
        totals: Vec<f64>,
        sums: ComponentSums,
    }

    let mut groups: HashMap<String, Acc> = HashMap::new();
    for r in records {
        let acc = groups.entry(r.date_key.clone()).or_insert_with(|| Acc {
            totals: vec![0.0; raw_metrics.len()],
            sums: ComponentSums::default(),
        });
        for (total, field) in acc.totals.iter_mut().zip(raw_metrics) {
            *total += r.number_or_zero(*field);
        }
        acc.sums.add(r);
    }
    debug!("Date aggregation produced {} group(s)", groups.len());

    let mut dated: Vec<(Option<NaiveDate>, AggregatePoint)> = groups
        .into_iter()
        .map(|(key, acc)| {
            let mut point = AggregatePoint::new(key);
            for (field, total) in raw_metrics.iter().zip(acc.totals) {
                point.values.insert(field.id().to_string(), finite_or_zero(total));
            }
            for metric in derived {
                point
                    .values
                    .insert(metric.id().to_string(), metric.compute(&acc.sums));
            }
            (parse_day_key(&point.name), point)
        })
        .collect();

    dated.sort_by(|a, b| compare_days(a, b));
    dated.into_iter().map(|(_, point)| point).collect()
}

// Calendar order; keys that are not dates go last, in string order.
fn compare_days(
    a: &(Option<NaiveDate>, AggregatePoint),
    b: &(Option<NaiveDate>, AggregatePoint),
) -> Ordering {
    match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.1.name.cmp(&b.1.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.1.name.cmp(&b.1.name),
    }
}

/// One point per distinct label of `category`, descending by value.
///
/// With `derived` set the value is that ratio and `mode` is ignored;
/// otherwise it is the sum (or mean per record) of `value_metric`. The value
/// is stored under the derived metric's id, or `value_metric`'s id. Equal
/// values keep the order in which their categories first appeared.
pub fn aggregate_by_category<'a, I>(
    records: I,
    category: Field,
    value_metric: Field,
    mode: AggregationMode,
    derived: Option<DerivedMetric>,
) -> Vec<AggregatePoint>
where
    I: IntoIterator<Item = &'a AdRecord>,
{
    struct Acc {
        label: String,
        sum: f64,
        count: usize,
        sums: ComponentSums,
    }

    let mut groups: Vec<Acc> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for r in records {
        let label = r
            .label(category)
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
        let idx = *index.entry(label.clone()).or_insert_with(|| {
            groups.push(Acc {
                label,
                sum: 0.0,
                count: 0,
                sums: ComponentSums::default(),
            });
            groups.len() - 1
        });
        let acc = &mut groups[idx];
        acc.sum += r.number_or_zero(value_metric);
        acc.count += 1;
        acc.sums.add(r);
    }
    debug!(
        "Category aggregation by {} produced {} group(s)",
        category,
        groups.len()
    );

    let metric_id = derived.map_or_else(|| value_metric.id(), DerivedMetric::id);
    let mut scored: Vec<(f64, AggregatePoint)> = groups
        .into_iter()
        .map(|acc| {
            let value = match (derived, mode) {
                (Some(metric), _) => metric.compute(&acc.sums),
                (None, AggregationMode::Sum) => finite_or_zero(acc.sum),
                (None, AggregationMode::Average) if acc.count > 0 => {
                    finite_or_zero(acc.sum / acc.count as f64)
                }
                (None, AggregationMode::Average) => 0.0,
            };
            let mut point = AggregatePoint::new(acc.label);
            point.values.insert(metric_id.to_string(), value);
            (value, point)
        })
        .collect();

    // `sort_by` is stable, so ties stay in first-seen order.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, point)| point).collect()
}
