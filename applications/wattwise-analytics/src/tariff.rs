use serde::{Deserialize, Serialize};

/// Per-kWh prices. Billing, annual cost projections and the annual stats
/// view are each priced separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    #[serde(default = "default_billing_rate")]
    pub billing_rate_per_kwh: f64,
    #[serde(default = "default_cost_per_kwh")]
    pub cost_per_kwh: f64,
    #[serde(default = "default_stats_rate")]
    pub stats_rate_per_kwh: f64,
}

fn default_billing_rate() -> f64 {
    0.17
}

fn default_cost_per_kwh() -> f64 {
    0.12
}

fn default_stats_rate() -> f64 {
    0.10
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            billing_rate_per_kwh: default_billing_rate(),
            cost_per_kwh: default_cost_per_kwh(),
            stats_rate_per_kwh: default_stats_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let tariff: Tariff = serde_json::from_str(r#"{"cost_per_kwh": 0.2}"#).unwrap();
        assert_eq!(tariff.billing_rate_per_kwh, 0.17);
        assert_eq!(tariff.cost_per_kwh, 0.2);
        assert_eq!(tariff.stats_rate_per_kwh, 0.10);
        assert_eq!(Tariff::default().cost_per_kwh, 0.12);
    }
}
