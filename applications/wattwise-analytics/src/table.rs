use crate::error::{AnalyticsError, Result};
use crate::filter::CalendarFilter;
use crate::models::reading::with_timestamps;
use crate::models::{Metric, Reading};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 1000;

/// A column of the raw readings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Datetime,
    ConsumerId,
    Value(Metric),
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Datetime,
        Column::Value(Metric::ActivePower),
        Column::Value(Metric::ReactivePower),
        Column::Value(Metric::Intensity),
        Column::Value(Metric::Voltage),
        Column::ConsumerId,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Datetime => "datetime",
            Column::ConsumerId => "consumer_id",
            Column::Value(metric) => metric.field_name(),
        }
    }

    fn cell(&self, reading: &Reading) -> String {
        match self {
            Column::Datetime => reading.datetime.clone(),
            Column::ConsumerId => reading
                .consumer_id
                .map_or_else(|| "N/A".to_string(), |id| id.to_string()),
            Column::Value(metric) => format_value(reading.value(*metric)),
        }
    }

    /// Parse a comma separated column list. An empty list selects every
    /// column.
    pub fn parse_list(raw: &str) -> Result<Vec<Column>> {
        let columns = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Column>>>()?;
        Ok(if columns.is_empty() {
            Column::ALL.to_vec()
        } else {
            columns
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "datetime" => Ok(Column::Datetime),
            "consumer_id" => Ok(Column::ConsumerId),
            _ => s.parse().map(Column::Value),
        }
    }
}

/// Two decimals, or `N/A` when the value is absent.
pub fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v))
}

/// Offset and size of one table page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(offset: Option<usize>, limit: Option<usize>) -> Result<Self> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AnalyticsError::InvalidFilter(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, limit
            )));
        }
        Ok(Self {
            offset: offset.unwrap_or(0),
            limit,
        })
    }
}

/// One page of formatted readings. `rows` are aligned with `columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingPage {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub offset: usize,
    pub limit: usize,
    /// 1-based page holding `offset`.
    pub page: usize,
    pub total_pages: usize,
    /// Readings passing the filter, across all pages.
    pub matched_rows: usize,
}

/// Filter readings by calendar fields and consumer, then cut one page in
/// upstream order. Readings with an unparseable timestamp are left out.
pub fn reading_page(
    readings: &[Reading],
    filter: &CalendarFilter,
    columns: &[Column],
    page: PageRequest,
) -> ReadingPage {
    let matched: Vec<&Reading> = with_timestamps(readings)
        .filter(|(ts, reading)| filter.matches(ts, reading))
        .map(|(_, reading)| reading)
        .collect();

    let rows = matched
        .iter()
        .skip(page.offset)
        .take(page.limit)
        .map(|reading| columns.iter().map(|column| column.cell(reading)).collect())
        .collect();

    ReadingPage {
        columns: columns.iter().map(Column::name).collect(),
        rows,
        offset: page.offset,
        limit: page.limit,
        page: page.offset / page.limit + 1,
        total_pages: matched.len().div_ceil(page.limit),
        matched_rows: matched.len(),
    }
}
