use crate::calc::{mean, pct_change};
use crate::filter::DateRange;
use crate::models::reading::with_timestamps;
use crate::models::{Metric, Reading};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

const WINDOW_RADIUS_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub active_power: f64,
}

/// Active power summed per UTC day within `range`. Days without a numeric
/// value are absent.
pub fn daily_totals(readings: &[Reading], range: &DateRange) -> Vec<DailyTotal> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (ts, reading) in with_timestamps(readings) {
        let date = ts.date_naive();
        if !range.contains(date) {
            continue;
        }
        if let Some(value) = reading.value(Metric::ActivePower) {
            *days.entry(date).or_insert(0.0) += value;
        }
    }
    days
        .into_iter()
        .map(|(date, active_power)| DailyTotal { date, active_power })
        .collect()
}

/// The busiest day in a range and the week around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakPeriod {
    pub range: DateRange,
    pub peak_day: NaiveDate,
    pub peak_total: f64,
    /// Peak day ± 3 days, clipped to `range`.
    pub window: DateRange,
    pub daily: Vec<DailyTotal>,
}

pub fn detect_peak_period(readings: &[Reading], range: &DateRange) -> Option<PeakPeriod> {
    let daily = daily_totals(readings, range);

    let mut peak: Option<DailyTotal> = None;
    for day in &daily {
        if peak.map_or(true, |best| day.active_power > best.active_power) {
            peak = Some(*day);
        }
    }
    let Some(peak) = peak else {
        debug!(start = %range.start, end = %range.end, "no readings in range");
        return None;
    };

    // Saturates at the calendar bounds; the intersect clips to `range`.
    let radius = Duration::days(WINDOW_RADIUS_DAYS);
    let around = DateRange {
        start: peak.date.checked_sub_signed(radius).unwrap_or(range.start),
        end: peak.date.checked_add_signed(radius).unwrap_or(range.end),
    };
    let window = around.intersect(range)?;

    Some(PeakPeriod {
        range: *range,
        peak_day: peak.date,
        peak_total: peak.active_power,
        window,
        daily,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ReducePeakUsage,
    LowUsage,
    Stable,
}

impl Recommendation {
    /// Classify a peak against its window average.
    pub fn assess(peak: f64, average: f64) -> Self {
        if peak > 1.5 * average {
            Recommendation::ReducePeakUsage
        } else if peak < 0.5 * average {
            Recommendation::LowUsage
        } else {
            Recommendation::Stable
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::ReducePeakUsage => {
                "Usage peaks well above average. Shift heavy appliances away from peak hours."
            }
            Recommendation::LowUsage => "Usage stayed well below average during this period.",
            Recommendation::Stable => "Usage is stable around the average.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricInsight {
    pub metric: Metric,
    pub label: &'static str,
    pub peak_value: f64,
    pub average: f64,
    pub change_from_average_percent: f64,
    pub recommendation: Recommendation,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    pub peak: PeakPeriod,
    pub insights: Vec<MetricInsight>,
}

/// Peak period for `range` plus per-metric figures over its window. Metrics
/// without numeric values in the window are left out.
pub fn insight_report(readings: &[Reading], range: &DateRange) -> Option<InsightReport> {
    let peak = detect_peak_period(readings, range)?;

    let in_window: Vec<&Reading> = with_timestamps(readings)
        .filter(|(ts, _)| peak.window.contains(ts.date_naive()))
        .map(|(_, reading)| reading)
        .collect();

    let insights = Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let values: Vec<f64> = in_window.iter().filter_map(|r| r.value(metric)).collect();
            let average = mean(&values)?;
            let peak_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let recommendation = Recommendation::assess(peak_value, average);
            Some(MetricInsight {
                metric,
                label: metric.label(),
                peak_value,
                average,
                change_from_average_percent: pct_change(peak_value, average),
                recommendation,
                message: recommendation.message(),
            })
        })
        .collect();

    Some(InsightReport { peak, insights })
}

/// The calendar month of the latest reading.
pub fn recent_month_range(readings: &[Reading]) -> Option<DateRange> {
    with_timestamps(readings)
        .map(|(ts, _)| ts.date_naive())
        .max()
        .map(DateRange::month_of)
}
