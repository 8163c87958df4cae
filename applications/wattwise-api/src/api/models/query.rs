use chrono::NaiveDate;
use serde::Deserialize;
use wattwise_analytics::{
    AnalyticsError, BillingMonth, CalendarFilter, Column, DateRange, Metric, PageRequest,
};

#[derive(Debug, Default, Deserialize)]
pub struct UsageParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub metric: Option<String>,
    pub consumer_id: Option<i64>,
}

impl UsageParams {
    pub fn filter(&self) -> Result<CalendarFilter, AnalyticsError> {
        let filter = CalendarFilter {
            year: self.year,
            month: self.month,
            day: self.day,
            consumer_id: self.consumer_id,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Defaults to active power.
    pub fn metric(&self) -> Result<Metric, AnalyticsError> {
        self.metric
            .as_deref()
            .map_or(Ok(Metric::ActivePower), str::parse::<Metric>)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReadingsParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub consumer_id: Option<i64>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Comma separated column names; all columns when absent.
    pub columns: Option<String>,
}

impl ReadingsParams {
    pub fn filter(&self) -> Result<CalendarFilter, AnalyticsError> {
        let filter = CalendarFilter {
            year: self.year,
            month: self.month,
            day: self.day,
            consumer_id: self.consumer_id,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn page(&self) -> Result<PageRequest, AnalyticsError> {
        PageRequest::new(self.offset, self.limit)
    }

    pub fn columns(&self) -> Result<Vec<Column>, AnalyticsError> {
        Column::parse_list(self.columns.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BillingParams {
    pub billing_month: Option<String>,
    pub consumer_id: Option<i64>,
}

impl BillingParams {
    pub fn billing_month(&self) -> Result<Option<BillingMonth>, AnalyticsError> {
        self.billing_month
            .as_deref()
            .map(str::parse::<BillingMonth>)
            .transpose()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct YearParams {
    pub year: Option<i32>,
    pub consumer_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InsightParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub consumer_id: Option<i64>,
}

impl InsightParams {
    /// The requested bounding range, if any. `from` and `to` come as a pair.
    pub fn range(&self) -> Result<Option<DateRange>, AnalyticsError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => DateRange::new(from, to).map(Some),
            (None, None) => Ok(None),
            _ => Err(AnalyticsError::InvalidRange(
                "from and to must be given together".into(),
            )),
        }
    }
}
