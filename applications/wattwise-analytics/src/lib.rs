//! Calendar aggregation, billing, cost projection and peak-period insights
//! over household electricity readings.
//!
//! Every function is pure: it takes a slice of [`Reading`]s and returns
//! freshly computed results. Malformed readings are skipped, never fatal.

pub mod aggregate;
pub mod billing;
pub mod calc;
pub mod cost;
pub mod error;
pub mod filter;
pub mod insights;
pub mod models;
pub mod table;
pub mod tariff;

pub use aggregate::{
    available_days, available_months, available_years, chart_series, group_sum, latest_year,
    metric_totals, AggregateResult, ChartSeries, MetricBreakdown, MetricSlice,
};
pub use billing::{
    calculate_billing, consumption_score, latest_billing, latest_month, BillingMonth,
    BillingSummary,
};
pub use calc::{pct_change, round2};
pub use cost::{
    annual_stats, cost_overview, metric_changes, project_annual_costs, AnnualCost, AnnualStats,
    CostOverview, MetricChange, MetricChanges, Trend,
};
pub use error::{AnalyticsError, Result};
pub use filter::{CalendarFilter, DateRange, Granularity};
pub use insights::{
    daily_totals, detect_peak_period, insight_report, recent_month_range, DailyTotal,
    InsightReport, MetricInsight, PeakPeriod, Recommendation,
};
pub use models::{parse_timestamp, readings_from_json, Metric, Reading};
pub use table::{format_value, reading_page, Column, PageRequest, ReadingPage};
pub use tariff::Tariff;
