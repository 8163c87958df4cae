use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four numeric fields carried by a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Global_active_power")]
    ActivePower,
    #[serde(rename = "Global_reactive_power")]
    ReactivePower,
    #[serde(rename = "Global_intensity")]
    Intensity,
    #[serde(rename = "Voltage")]
    Voltage,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::ActivePower,
        Metric::ReactivePower,
        Metric::Intensity,
        Metric::Voltage,
    ];

    /// Field name used by the upstream readings API.
    pub fn field_name(&self) -> &'static str {
        match self {
            Metric::ActivePower => "Global_active_power",
            Metric::ReactivePower => "Global_reactive_power",
            Metric::Intensity => "Global_intensity",
            Metric::Voltage => "Voltage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::ActivePower => "Active Power",
            Metric::ReactivePower => "Reactive Power",
            Metric::Intensity => "Intensity",
            Metric::Voltage => "Voltage",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::ActivePower | Metric::ReactivePower => "kW",
            Metric::Intensity => "A",
            Metric::Voltage => "V",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for Metric {
    type Err = AnalyticsError;

    /// Accepts the upstream field names (case-insensitive) and the short
    /// aliases some dashboard views used (`Reactive_power`, `Intensity`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global_active_power" | "active_power" => Ok(Metric::ActivePower),
            "global_reactive_power" | "reactive_power" => Ok(Metric::ReactivePower),
            "global_intensity" | "intensity" => Ok(Metric::Intensity),
            "voltage" => Ok(Metric::Voltage),
            _ => Err(AnalyticsError::UnknownMetric(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_names() {
        for metric in Metric::ALL {
            assert_eq!(metric.field_name().parse::<Metric>(), Ok(metric));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Reactive_power".parse::<Metric>(), Ok(Metric::ReactivePower));
        assert_eq!("intensity".parse::<Metric>(), Ok(Metric::Intensity));
        assert_eq!(" VOLTAGE ".parse::<Metric>(), Ok(Metric::Voltage));
    }

    #[test]
    fn test_parse_unknown_metric() {
        assert_eq!(
            "Sub_metering_1".parse::<Metric>(),
            Err(AnalyticsError::UnknownMetric("Sub_metering_1".into()))
        );
    }

    #[test]
    fn test_serde_uses_field_names() {
        let json = serde_json::to_string(&Metric::ActivePower).unwrap();
        assert_eq!(json, "\"Global_active_power\"");

        let metric: Metric = serde_json::from_str("\"Voltage\"").unwrap();
        assert_eq!(metric, Metric::Voltage);
    }
}
