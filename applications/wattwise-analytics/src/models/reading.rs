use super::Metric;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Naive timestamp layouts seen from the readings API, interpreted as UTC.
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A raw power usage sample as returned by the readings API.
///
/// Every numeric field is optional: the API supports column selection, and the
/// household dataset it serves marks missing samples with `"?"`. Such values
/// deserialize to `None` rather than failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Raw upstream timestamp; empty when the payload had none.
    #[serde(default, deserialize_with = "lenient_string")]
    pub datetime: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub consumer_id: Option<i64>,
    #[serde(
        rename = "Global_active_power",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub global_active_power: Option<f64>,
    #[serde(
        rename = "Global_reactive_power",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub global_reactive_power: Option<f64>,
    #[serde(rename = "Global_intensity", default, deserialize_with = "lenient_f64")]
    pub global_intensity: Option<f64>,
    #[serde(rename = "Voltage", default, deserialize_with = "lenient_f64")]
    pub voltage: Option<f64>,
}

impl Reading {
    /// A reading with a timestamp and no measurements.
    pub fn new(datetime: impl Into<String>) -> Self {
        Self {
            datetime: datetime.into(),
            consumer_id: None,
            global_active_power: None,
            global_reactive_power: None,
            global_intensity: None,
            voltage: None,
        }
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        *self.slot(metric) = Some(value);
        self
    }

    pub fn with_consumer(mut self, consumer_id: i64) -> Self {
        self.consumer_id = Some(consumer_id);
        self
    }

    /// Whether the reading is in scope for `consumer_id`. Readings without a
    /// consumer id are always in scope; the readings API already scoped them.
    pub fn belongs_to(&self, consumer_id: Option<i64>) -> bool {
        match (consumer_id, self.consumer_id) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.datetime)
    }

    /// The numeric value of `metric`, or `None` when absent or not finite.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let value = match metric {
            Metric::ActivePower => self.global_active_power,
            Metric::ReactivePower => self.global_reactive_power,
            Metric::Intensity => self.global_intensity,
            Metric::Voltage => self.voltage,
        };
        value.filter(|v| v.is_finite())
    }

    fn slot(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::ActivePower => &mut self.global_active_power,
            Metric::ReactivePower => &mut self.global_reactive_power,
            Metric::Intensity => &mut self.global_intensity,
            Metric::Voltage => &mut self.voltage,
        }
    }
}

/// Parse an upstream timestamp as UTC.
///
/// Accepts RFC 3339, the API's `YYYY-MM-DD HH:MM:SS` layout (with or without a
/// `T` separator or fractional seconds) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Pair each reading with its parsed timestamp, skipping unparseable ones.
pub(crate) fn with_timestamps(
    readings: &[Reading],
) -> impl Iterator<Item = (DateTime<Utc>, &Reading)> {
    readings.iter().filter_map(|reading| match reading.timestamp() {
        Some(ts) => Some((ts, reading)),
        None => {
            debug!(datetime = %reading.datetime, "skipping reading with invalid timestamp");
            None
        }
    })
}

/// Parse a readings API payload. Rows that are not objects, or that fail to
/// deserialize, are skipped; only a payload that is not a JSON array fails.
pub fn readings_from_json(raw: &str) -> serde_json::Result<Vec<Reading>> {
    let rows: Vec<Value> = serde_json::from_str(raw)?;
    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<Reading>(row) {
            Ok(reading) => Some(reading),
            Err(e) => {
                debug!(index, error = %e, "skipping malformed reading row");
                None
            }
        })
        .collect())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(cast_f64))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn cast_f64(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_parse_upstream_timestamp() {
        let ts = parse_timestamp("2008-03-05 17:24:00").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2008, 3, 5));
        assert_eq!((ts.hour(), ts.minute()), (17, 24));
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        let ts = parse_timestamp("2008-03-05T01:00:00+02:00").unwrap();
        assert_eq!((ts.day(), ts.hour()), (4, 23));
    }

    #[test]
    fn test_parse_iso8601_and_date_only() {
        assert!(parse_timestamp("2008-03-05T17:24:00").is_some());
        let midnight = parse_timestamp("2008-03-05").unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("05/03/2008 17:24").is_none());
        assert!(parse_timestamp("2008-13-40 00:00:00").is_none());
    }

    #[test]
    fn test_deserialize_full_reading() {
        let reading: Reading = serde_json::from_value(json!({
            "datetime": "2007-01-01 00:00:00",
            "consumer_id": 7,
            "Global_active_power": 2.58,
            "Global_reactive_power": 0.136,
            "Global_intensity": 10.6,
            "Voltage": 241.97
        }))
        .unwrap();

        assert_eq!(reading.consumer_id, Some(7));
        assert_eq!(reading.value(Metric::ActivePower), Some(2.58));
        assert_eq!(reading.value(Metric::Voltage), Some(241.97));
    }

    #[test]
    fn test_deserialize_non_numeric_values_as_absent() {
        let reading: Reading = serde_json::from_value(json!({
            "datetime": "2007-04-28 00:21:00",
            "consumer_id": "3",
            "Global_active_power": "?",
            "Global_reactive_power": null,
            "Global_intensity": "4.2",
            "Voltage": {"nested": true}
        }))
        .unwrap();

        assert_eq!(reading.consumer_id, Some(3));
        assert_eq!(reading.value(Metric::ActivePower), None);
        assert_eq!(reading.value(Metric::ReactivePower), None);
        assert_eq!(reading.value(Metric::Intensity), Some(4.2));
        assert_eq!(reading.value(Metric::Voltage), None);
    }

    #[test]
    fn test_deserialize_selected_columns_only() {
        let reading: Reading = serde_json::from_value(json!({
            "datetime": "2007-01-01 00:00:00",
            "Voltage": 240.1
        }))
        .unwrap();

        assert_eq!(reading.consumer_id, None);
        assert_eq!(reading.value(Metric::ActivePower), None);
        assert_eq!(reading.value(Metric::Voltage), Some(240.1));
    }

    #[test]
    fn test_belongs_to() {
        let owned = Reading::new("2007-01-01 00:00:00").with_consumer(4);
        let anonymous = Reading::new("2007-01-01 00:00:00");

        assert!(owned.belongs_to(None));
        assert!(owned.belongs_to(Some(4)));
        assert!(!owned.belongs_to(Some(5)));
        assert!(anonymous.belongs_to(Some(5)));
    }

    #[test]
    fn test_value_ignores_non_finite() {
        let reading = Reading::new("2007-01-01 00:00:00").with(Metric::ActivePower, f64::NAN);
        assert_eq!(reading.value(Metric::ActivePower), None);
    }

    #[test]
    fn test_with_timestamps_skips_invalid() {
        let readings = vec![
            Reading::new("2007-01-01 00:00:00"),
            Reading::new("not a date"),
            Reading::new("2007-01-02 00:00:00"),
        ];
        assert_eq!(with_timestamps(&readings).count(), 2);
    }

    #[test]
    fn test_null_or_missing_datetime_is_skipped_not_fatal() {
        let raw = r#"[
            {"datetime": "2007-01-01 00:00:00", "Global_active_power": 1.0},
            {"datetime": null, "Global_active_power": 2.0},
            {"Global_active_power": 3.0},
            {"datetime": 20070101, "Global_active_power": 4.0},
            "not an object"
        ]"#;

        let readings = readings_from_json(raw).unwrap();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[1].datetime, "");
        assert_eq!(readings[2].datetime, "");
        assert_eq!(with_timestamps(&readings).count(), 1);

        let typed: Vec<Reading> = serde_json::from_str(
            r#"[{"datetime": null}, {"Voltage": 240.0}, {"datetime": "2007-01-01"}]"#,
        )
        .unwrap();
        assert_eq!(typed.len(), 3);
    }

    #[test]
    fn test_payload_must_be_an_array() {
        assert!(readings_from_json(r#"{"error": "down"}"#).is_err());
    }
}
