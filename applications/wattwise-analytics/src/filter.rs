use crate::error::{AnalyticsError, Result};
use crate::models::Reading;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Calendar bucket size used for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Year,
    Month,
    Day,
    Hour,
}

impl Granularity {
    /// Zero-padded bucket key for `ts`; keys of one granularity sort
    /// chronologically.
    pub fn key(&self, ts: &DateTime<Utc>) -> String {
        let format = match self {
            Granularity::Year => "%Y",
            Granularity::Month => "%Y-%m",
            Granularity::Day => "%Y-%m-%d",
            Granularity::Hour => "%Y-%m-%d %H",
        };
        ts.format(format).to_string()
    }
}

/// Optional year/month/day/consumer filter applied before grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub consumer_id: Option<i64>,
}

impl CalendarFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_consumer(mut self, consumer_id: i64) -> Self {
        self.consumer_id = Some(consumer_id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(AnalyticsError::InvalidFilter(format!(
                    "month must be between 1 and 12, got {}",
                    month
                )));
            }
        }
        if let Some(day) = self.day {
            if !(1..=31).contains(&day) {
                return Err(AnalyticsError::InvalidFilter(format!(
                    "day must be between 1 and 31, got {}",
                    day
                )));
            }
        }
        Ok(())
    }

    /// Grouping granularity: each filter level along year → month → day
    /// refines the buckets one step. A month or day without its parent
    /// still filters but does not refine.
    pub fn granularity(&self) -> Granularity {
        match (self.year, self.month, self.day) {
            (Some(_), Some(_), Some(_)) => Granularity::Hour,
            (Some(_), Some(_), None) => Granularity::Day,
            (Some(_), None, _) => Granularity::Month,
            (None, _, _) => Granularity::Year,
        }
    }

    /// Whether a reading taken at `ts` passes the filter. Consumer scoping
    /// follows [`Reading::belongs_to`].
    pub fn matches(&self, ts: &DateTime<Utc>, reading: &Reading) -> bool {
        if self.year.is_some_and(|year| ts.year() != year) {
            return false;
        }
        if self.month.is_some_and(|month| ts.month() != month) {
            return false;
        }
        if self.day.is_some_and(|day| ts.day() != day) {
            return false;
        }
        reading.belongs_to(self.consumer_id)
    }

    /// Chart title for the active filter: `Year`, `2008`, `March, 2008` or
    /// `March 5, 2008`.
    pub fn title(&self) -> String {
        match (self.year, self.month.and_then(month_name), self.day) {
            (None, _, _) => "Year".to_string(),
            (Some(year), Some(month), Some(day)) => format!("{} {}, {}", month, day, year),
            (Some(year), Some(month), None) => format!("{}, {}", month, year),
            (Some(year), None, _) => year.to_string(),
        }
    }
}

pub(crate) fn month_name(month: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(2000, month, 1).map(|d| d.format("%B").to_string())
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The calendar month containing `date`. The last representable month
    /// ends at [`NaiveDate::MAX`].
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = next_month_start(start)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Overlap with `other`, if any.
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateRange { start, end })
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

pub(crate) fn next_month_start(first_of_month: NaiveDate) -> Option<NaiveDate> {
    if first_of_month.month() == 12 {
        NaiveDate::from_ymd_opt(first_of_month.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first_of_month.year(), first_of_month.month() + 1, 1)
    }
}
