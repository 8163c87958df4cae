use crate::calc::{mean, pct_change};
use crate::filter::month_name;
use crate::models::reading::with_timestamps;
use crate::models::{Metric, Reading};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Cost projection for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualCost {
    pub year: i32,
    /// Active power sum over the year's readings, in kWh.
    pub energy_kwh: f64,
    /// `energy_kwh` scaled up to a full year of hours.
    pub annual_energy_kwh: f64,
    pub annual_cost: f64,
    /// Change versus the calendar year before, when that year has data.
    pub change_from_previous_percent: Option<f64>,
}

/// Project an annual cost for every year present, oldest first.
pub fn project_annual_costs(readings: &[Reading], cost_per_kwh: f64) -> Vec<AnnualCost> {
    let mut sums: BTreeMap<i32, f64> = BTreeMap::new();
    for (ts, reading) in with_timestamps(readings) {
        let sum = sums.entry(ts.year()).or_insert(0.0);
        if let Some(value) = reading.value(Metric::ActivePower) {
            *sum += value;
        }
    }

    let mut costs: Vec<AnnualCost> = Vec::with_capacity(sums.len());
    for (year, sum) in sums {
        let energy_kwh = sum / 1000.0;
        let annual_energy_kwh = energy_kwh * HOURS_PER_YEAR;
        let annual_cost = annual_energy_kwh * cost_per_kwh;
        let change_from_previous_percent = costs
            .last()
            .filter(|previous| previous.year == year - 1)
            .map(|previous| pct_change(annual_cost, previous.annual_cost));

        costs.push(AnnualCost {
            year,
            energy_kwh,
            annual_energy_kwh,
            annual_cost,
            change_from_previous_percent,
        });
    }
    costs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increased,
    Decreased,
    Unchanged,
}

impl Trend {
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            Trend::Increased
        } else if change_percent < 0.0 {
            Trend::Decreased
        } else {
            Trend::Unchanged
        }
    }
}

/// The latest year's projected cost compared with the year before.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostOverview {
    pub year: i32,
    pub annual_cost: f64,
    pub previous_year: Option<i32>,
    pub previous_cost: Option<f64>,
    pub change_percent: Option<f64>,
    pub trend: Option<Trend>,
    pub message: Option<String>,
}

pub fn cost_overview(readings: &[Reading], cost_per_kwh: f64) -> Option<CostOverview> {
    let costs = project_annual_costs(readings, cost_per_kwh);
    let latest = costs.last()?;
    let previous = costs
        .iter()
        .rev()
        .nth(1)
        .filter(|previous| previous.year == latest.year - 1);

    let change_percent = latest.change_from_previous_percent;
    let trend = change_percent.map(Trend::from_change);
    let message = change_percent.map(|change| match Trend::from_change(change) {
        Trend::Increased => format!(
            "The cost has increased by {:.2}% compared to last year.",
            change
        ),
        Trend::Decreased => format!(
            "The cost has decreased by {:.2}% compared to last year.",
            change.abs()
        ),
        Trend::Unchanged => "The cost is the same as last year.".to_string(),
    });

    Some(CostOverview {
        year: latest.year,
        annual_cost: latest.annual_cost,
        previous_year: previous.map(|p| p.year),
        previous_cost: previous.map(|p| p.annual_cost),
        change_percent,
        trend,
        message,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChange {
    pub metric: Metric,
    pub label: &'static str,
    pub current_average: Option<f64>,
    pub previous_average: Option<f64>,
    /// `None` when either year has no numeric values for the metric.
    pub change_percent: Option<f64>,
    pub message: String,
}

/// Year-over-year change of each metric's average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChanges {
    pub year: i32,
    pub previous_year: i32,
    pub changes: Vec<MetricChange>,
}

/// Compare metric averages between the two most recent years present.
pub fn metric_changes(readings: &[Reading]) -> Option<MetricChanges> {
    let mut by_year: BTreeMap<i32, Vec<&Reading>> = BTreeMap::new();
    for (ts, reading) in with_timestamps(readings) {
        by_year.entry(ts.year()).or_default().push(reading);
    }

    let mut recent = by_year.iter().rev();
    let (&year, current) = recent.next()?;
    let (&previous_year, previous) = recent.next()?;

    let changes = Metric::ALL
        .into_iter()
        .map(|metric| {
            let current_average = average(current, metric);
            let previous_average = average(previous, metric);
            let change_percent = current_average
                .zip(previous_average)
                .map(|(new, old)| pct_change(new, old));
            MetricChange {
                metric,
                label: metric.label(),
                current_average,
                previous_average,
                change_percent,
                message: change_message(metric, change_percent),
            }
        })
        .collect();

    Some(MetricChanges {
        year,
        previous_year,
        changes,
    })
}

fn average(readings: &[&Reading], metric: Metric) -> Option<f64> {
    let values: Vec<f64> = readings.iter().filter_map(|r| r.value(metric)).collect();
    mean(&values)
}

fn change_message(metric: Metric, change_percent: Option<f64>) -> String {
    let Some(change) = change_percent else {
        return "No calculated change from previous year.".to_string();
    };
    match Trend::from_change(change) {
        Trend::Unchanged => "No significant change from previous year.".to_string(),
        Trend::Increased => format!(
            "Increased by {:.2}% from previous year. Possible cause: {}",
            change,
            likely_cause(metric)
        ),
        Trend::Decreased => format!("Decreased by {:.2}% from previous year.", change.abs()),
    }
}

fn likely_cause(metric: Metric) -> &'static str {
    match metric {
        Metric::ActivePower => "extended use of high-power appliances.",
        _ => "high load or grid fluctuations.",
    }
}

/// Cost statistics for one year, treating each active power sample as kWh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualStats {
    pub year: i32,
    pub total_kwh: f64,
    pub total_cost: f64,
    pub average_monthly_cost: f64,
    pub previous_year_cost: f64,
    pub change_from_previous_percent: f64,
    pub peak_month: Option<u32>,
    pub peak_month_name: Option<String>,
    pub peak_month_cost: f64,
    pub peak_vs_average_percent: f64,
    pub message: String,
}

pub fn annual_stats(readings: &[Reading], year: i32, rate_per_kwh: f64) -> AnnualStats {
    let mut total_kwh = 0.0;
    let mut previous_kwh = 0.0;
    let mut monthly_cost: BTreeMap<u32, f64> = BTreeMap::new();

    for (ts, reading) in with_timestamps(readings) {
        let active = reading.value(Metric::ActivePower).unwrap_or(0.0);
        if ts.year() == year {
            total_kwh += active;
            *monthly_cost.entry(ts.month()).or_insert(0.0) += active * rate_per_kwh;
        } else if ts.year() == year - 1 {
            previous_kwh += active;
        }
    }

    let total_cost = total_kwh * rate_per_kwh;
    let average_monthly_cost = total_kwh / 12.0 * rate_per_kwh;
    let previous_year_cost = previous_kwh * rate_per_kwh;

    // First month wins ties; a month only peaks with a positive cost.
    let mut peak: Option<(u32, f64)> = None;
    for (&month, &cost) in &monthly_cost {
        if cost > peak.map_or(0.0, |(_, best)| best) {
            peak = Some((month, cost));
        }
    }
    let peak_month_cost = peak.map_or(0.0, |(_, cost)| cost);
    let peak_vs_average_percent = pct_change(peak_month_cost, average_monthly_cost);

    let message = match Trend::from_change(peak_vs_average_percent) {
        Trend::Increased => format!(
            "Peak month cost is {:.2}% higher than the average monthly cost.",
            peak_vs_average_percent
        ),
        Trend::Decreased => format!(
            "Peak month cost is {:.2}% lower than the average monthly cost.",
            peak_vs_average_percent.abs()
        ),
        Trend::Unchanged => "Peak month cost equals the average monthly cost.".to_string(),
    };

    AnnualStats {
        year,
        total_kwh,
        total_cost,
        average_monthly_cost,
        previous_year_cost,
        change_from_previous_percent: pct_change(total_cost, previous_year_cost),
        peak_month: peak.map(|(month, _)| month),
        peak_month_name: peak.and_then(|(month, _)| month_name(month)),
        peak_month_cost,
        peak_vs_average_percent,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn active(datetime: &str, value: f64) -> Reading {
        Reading::new(datetime).with(Metric::ActivePower, value)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_project_annual_costs() {
        let readings = vec![
            active("2007-03-01 00:00:00", 1.0),
            active("2007-09-01 00:00:00", 1.0),
            active("2008-03-01 00:00:00", 3.0),
            Reading::new("2008-04-01 00:00:00"),
        ];

        let costs = project_annual_costs(&readings, 0.12);
        assert_eq!(costs.len(), 2);

        assert_eq!(costs[0].year, 2007);
        assert!(close(costs[0].energy_kwh, 0.002));
        assert!(close(costs[0].annual_energy_kwh, 0.002 * 8760.0));
        assert!(close(costs[0].annual_cost, 0.002 * 8760.0 * 0.12));
        assert_eq!(costs[0].change_from_previous_percent, None);

        assert_eq!(costs[1].year, 2008);
        assert!(close(costs[1].change_from_previous_percent.unwrap(), 50.0));
    }

    #[test]
    fn test_change_requires_adjacent_year() {
        let readings = vec![
            active("2006-03-01 00:00:00", 1.0),
            active("2008-03-01 00:00:00", 3.0),
        ];
        let costs = project_annual_costs(&readings, 0.12);
        assert_eq!(costs[1].change_from_previous_percent, None);
    }

    #[test]
    fn test_change_from_zero_cost_year() {
        let readings = vec![
            Reading::new("2007-03-01 00:00:00"),
            active("2008-03-01 00:00:00", 3.0),
        ];
        let costs = project_annual_costs(&readings, 0.12);
        assert_eq!(costs[0].annual_cost, 0.0);
        assert_eq!(costs[1].change_from_previous_percent, Some(100.0));
    }

    #[test]
    fn test_cost_overview() {
        let readings = vec![
            active("2007-03-01 00:00:00", 4.0),
            active("2008-03-01 00:00:00", 3.0),
        ];
        let overview = cost_overview(&readings, 0.12).unwrap();

        assert_eq!(overview.year, 2008);
        assert_eq!(overview.previous_year, Some(2007));
        assert_eq!(overview.trend, Some(Trend::Decreased));
        assert_eq!(
            overview.message.as_deref(),
            Some("The cost has decreased by 25.00% compared to last year.")
        );
    }

    #[test]
    fn test_cost_overview_single_year() {
        let overview = cost_overview(&[active("2008-03-01 00:00:00", 3.0)], 0.12).unwrap();
        assert_eq!(overview.previous_cost, None);
        assert_eq!(overview.trend, None);
        assert_eq!(overview.message, None);
        assert!(cost_overview(&[], 0.12).is_none());
    }

    #[test]
    fn test_metric_changes() {
        let readings = vec![
            Reading::new("2007-01-01 00:00:00")
                .with(Metric::ActivePower, 2.0)
                .with(Metric::Voltage, 240.0),
            Reading::new("2007-02-01 00:00:00")
                .with(Metric::ActivePower, 4.0)
                .with(Metric::Voltage, 240.0),
            Reading::new("2008-01-01 00:00:00")
                .with(Metric::ActivePower, 6.0)
                .with(Metric::Voltage, 240.0)
                .with(Metric::Intensity, 1.0),
        ];

        let changes = metric_changes(&readings).unwrap();
        assert_eq!((changes.year, changes.previous_year), (2008, 2007));

        let active = &changes.changes[0];
        assert_eq!(active.metric, Metric::ActivePower);
        assert_eq!(active.change_percent, Some(100.0));
        assert_eq!(
            active.message,
            "Increased by 100.00% from previous year. Possible cause: extended use of high-power appliances."
        );

        let intensity = &changes.changes[2];
        assert_eq!(intensity.change_percent, None);
        assert_eq!(intensity.message, "No calculated change from previous year.");

        let voltage = &changes.changes[3];
        assert_eq!(voltage.change_percent, Some(0.0));
        assert_eq!(voltage.message, "No significant change from previous year.");
    }

    #[test]
    fn test_metric_changes_needs_two_years() {
        assert!(metric_changes(&[active("2008-01-01 00:00:00", 1.0)]).is_none());
    }

    #[test]
    fn test_annual_stats() {
        let readings = vec![
            active("2007-05-01 00:00:00", 50.0),
            active("2008-01-10 00:00:00", 30.0),
            active("2008-01-20 00:00:00", 30.0),
            active("2008-06-01 00:00:00", 60.0),
        ];

        let stats = annual_stats(&readings, 2008, 0.5);
        assert!(close(stats.total_kwh, 120.0));
        assert!(close(stats.total_cost, 60.0));
        assert!(close(stats.average_monthly_cost, 5.0));
        assert!(close(stats.previous_year_cost, 25.0));
        assert!(close(stats.change_from_previous_percent, 140.0));
        // January and June tie at 30.0; the earlier month wins.
        assert_eq!(stats.peak_month, Some(1));
        assert_eq!(stats.peak_month_name.as_deref(), Some("January"));
        assert!(close(stats.peak_vs_average_percent, 500.0));
        assert_eq!(
            stats.message,
            "Peak month cost is 500.00% higher than the average monthly cost."
        );
    }

    #[test]
    fn test_annual_stats_without_data() {
        let stats = annual_stats(&[], 2008, 0.5);
        assert_eq!(stats.peak_month, None);
        assert_eq!(stats.change_from_previous_percent, 0.0);
        assert_eq!(stats.message, "Peak month cost equals the average monthly cost.");
    }
}
