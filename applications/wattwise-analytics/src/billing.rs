use crate::calc::round2;
use crate::error::{AnalyticsError, Result};
use crate::filter::next_month_start;
use crate::models::reading::with_timestamps;
use crate::models::{Metric, Reading};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(AnalyticsError::InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn of(ts: &DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.first_day()
            .and_then(next_month_start)
            .and_then(|next| next.pred_opt())
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingMonth {
    type Err = AnalyticsError;

    /// Parses `YYYY-MM`; a single-digit month (`2008-3`) is accepted too.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AnalyticsError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for BillingMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Weighted consumption score of one reading; absent fields count as zero.
pub fn consumption_score(reading: &Reading) -> f64 {
    let field = |metric| reading.value(metric).unwrap_or(0.0);
    field(Metric::ActivePower) * 1.0
        + field(Metric::ReactivePower) * 0.8
        + field(Metric::Intensity) * 0.5
        + field(Metric::Voltage) / 1000.0
}

/// Billing figures for one month. Consumption is in kWh at full precision;
/// use [`BillingSummary::rounded`] for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingSummary {
    pub month: BillingMonth,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_consumption_kwh: f64,
    pub average_consumption_kwh: f64,
    pub billing_amount: f64,
    pub start_consumption_kwh: f64,
    pub end_consumption_kwh: f64,
    pub reading_count: usize,
}

impl BillingSummary {
    pub fn rounded(&self) -> Self {
        Self {
            total_consumption_kwh: round2(self.total_consumption_kwh),
            average_consumption_kwh: round2(self.average_consumption_kwh),
            billing_amount: round2(self.billing_amount),
            start_consumption_kwh: round2(self.start_consumption_kwh),
            end_consumption_kwh: round2(self.end_consumption_kwh),
            ..self.clone()
        }
    }
}

/// Bill `month` as the change in weighted consumption from the preceding
/// month.
///
/// Returns `None` when the delta is exactly zero or when `month` holds no
/// readings; both leave the figures undefined.
pub fn calculate_billing(
    readings: &[Reading],
    month: BillingMonth,
    rate_per_kwh: f64,
) -> Option<BillingSummary> {
    let previous = month.previous();
    let mut start_raw = 0.0;
    let mut end_raw = 0.0;
    let mut reading_count = 0usize;

    for (ts, reading) in with_timestamps(readings) {
        let reading_month = BillingMonth::of(&ts);
        if reading_month == previous {
            start_raw += consumption_score(reading);
        } else if reading_month == month {
            end_raw += consumption_score(reading);
            reading_count += 1;
        }
    }

    let total_raw = end_raw - start_raw;
    if total_raw == 0.0 || reading_count == 0 {
        debug!(month = %month, reading_count, "billing unavailable");
        return None;
    }

    let average_raw = total_raw / reading_count as f64;
    Some(BillingSummary {
        month,
        period_start: month.first_day()?,
        period_end: month.last_day()?,
        total_consumption_kwh: total_raw / 1000.0,
        average_consumption_kwh: average_raw / 1000.0,
        billing_amount: (total_raw / 1000.0) * rate_per_kwh,
        start_consumption_kwh: start_raw / 1000.0,
        end_consumption_kwh: end_raw / 1000.0,
        reading_count,
    })
}

/// The most recent month present in `readings`.
pub fn latest_month(readings: &[Reading]) -> Option<BillingMonth> {
    with_timestamps(readings)
        .map(|(ts, _)| BillingMonth::of(&ts))
        .max()
}

/// Bill the most recent month present in `readings`.
pub fn latest_billing(readings: &[Reading], rate_per_kwh: f64) -> Option<BillingSummary> {
    calculate_billing(readings, latest_month(readings)?, rate_per_kwh)
}
