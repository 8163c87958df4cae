use crate::filter::{CalendarFilter, Granularity};
use crate::models::reading::with_timestamps;
use crate::models::{Metric, Reading};
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Bucket key → summed metric value, iterated in chronological order.
pub type AggregateResult = BTreeMap<String, f64>;

/// Sum `metric` per calendar bucket over the readings that pass `filter`.
///
/// Readings with an unparseable timestamp or a non-numeric value are skipped.
/// An empty result is a normal outcome.
pub fn group_sum(readings: &[Reading], filter: &CalendarFilter, metric: Metric) -> AggregateResult {
    let granularity = filter.granularity();
    let mut groups = AggregateResult::new();

    for (ts, reading) in with_timestamps(readings) {
        if !filter.matches(&ts, reading) {
            continue;
        }
        let Some(value) = reading.value(metric) else {
            debug!(
                metric = %metric,
                datetime = %reading.datetime,
                "skipping non-numeric value"
            );
            continue;
        };
        *groups.entry(granularity.key(&ts)).or_insert(0.0) += value;
    }

    groups
}

/// Ordered label/value pairs ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub metric: Metric,
    pub granularity: Granularity,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub fn chart_series(readings: &[Reading], filter: &CalendarFilter, metric: Metric) -> ChartSeries {
    let (labels, values): (Vec<String>, Vec<f64>) =
        group_sum(readings, filter, metric).into_iter().unzip();
    ChartSeries {
        title: filter.title(),
        metric,
        granularity: filter.granularity(),
        labels,
        values,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSlice {
    pub metric: Metric,
    pub label: &'static str,
    pub total: f64,
}

/// Per-metric totals for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBreakdown {
    pub year: i32,
    pub reading_count: usize,
    pub slices: Vec<MetricSlice>,
}

impl MetricBreakdown {
    pub fn total(&self, metric: Metric) -> f64 {
        self.slices
            .iter()
            .find(|slice| slice.metric == metric)
            .map(|slice| slice.total)
            .unwrap_or(0.0)
    }
}

pub fn metric_totals(readings: &[Reading], year: i32) -> MetricBreakdown {
    let mut totals = [0.0; 4];
    let mut reading_count = 0;

    for (_, reading) in with_timestamps(readings).filter(|(ts, _)| ts.year() == year) {
        reading_count += 1;
        for (total, metric) in totals.iter_mut().zip(Metric::ALL) {
            *total += reading.value(metric).unwrap_or(0.0);
        }
    }

    MetricBreakdown {
        year,
        reading_count,
        slices: Metric::ALL
            .into_iter()
            .zip(totals)
            .map(|(metric, total)| MetricSlice {
                metric,
                label: metric.label(),
                total,
            })
            .collect(),
    }
}

pub fn available_years(readings: &[Reading]) -> Vec<i32> {
    with_timestamps(readings)
        .map(|(ts, _)| ts.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn available_months(readings: &[Reading], year: i32) -> Vec<u32> {
    with_timestamps(readings)
        .filter(|(ts, _)| ts.year() == year)
        .map(|(ts, _)| ts.month())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn available_days(readings: &[Reading], year: i32, month: u32) -> Vec<u32> {
    with_timestamps(readings)
        .filter(|(ts, _)| ts.year() == year && ts.month() == month)
        .map(|(ts, _)| ts.day())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn latest_year(readings: &[Reading]) -> Option<i32> {
    with_timestamps(readings).map(|(ts, _)| ts.year()).max()
}
