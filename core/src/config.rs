use crate::pareto::Dimension;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Thresholds for the retention health labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Latest cohort's month-1 retention above this is "Healthy".
    pub healthy_m1_pct: f64,
    /// Average month-1 retention above this is "Strong".
    pub strong_avg_m1_pct: f64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            healthy_m1_pct: 70.0,
            strong_avg_m1_pct: 75.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParetoConfig {
    /// Dimension the report groups revenue by.
    pub dimension: Dimension,
    /// Revenue share used for the "keys needed" headline.
    pub target_share_pct: f64,
    /// Top-20% publisher or genre share above this is "concentrated".
    pub concentration_alert_pct: f64,
    /// Top-customer share above this is "concentrated".
    pub customer_concentration_alert_pct: f64,
}

impl Default for ParetoConfig {
    fn default() -> Self {
        Self {
            dimension: Dimension::Genre,
            target_share_pct: 80.0,
            concentration_alert_pct: 75.0,
            customer_concentration_alert_pct: 60.0,
        }
    }
}

/// What-if levers applied to current revenue and MAU.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub price_increase_pct: f64,
    pub mau_growth_pct:     f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            price_increase_pct: 5.0,
            mau_growth_pct:     8.0,
        }
    }
}

/// Shape of the generated purchase history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub customers: usize,
    pub start_date: NaiveDate,
    pub months: u32,
    /// Probability a customer buys in the month after joining.
    pub monthly_activity: f64,
    /// Multiplier applied to `monthly_activity` for every further month.
    pub activity_decay: f64,
    pub revenue_pareto_xmin: f64,
    pub revenue_pareto_alpha: f64,
    pub revenue_cap: f64,
    pub max_games_per_purchase: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            customers: 500,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            months: 12,
            monthly_activity: 0.60,
            activity_decay: 0.90,
            revenue_pareto_xmin: 4.99,
            revenue_pareto_alpha: 1.6,
            revenue_cap: 400.0,
            max_games_per_purchase: 4,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub pareto:    ParetoConfig,
    #[serde(default)]
    pub synthetic: SyntheticConfig,
    #[serde(default)]
    pub scenario:  ScenarioConfig,
}

impl InsightsConfig {
    /// Load from the data/ directory.
    /// In tests, use InsightsConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/insights_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: InsightsConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Small, fast configuration for tests: 60 customers over six months.
    pub fn default_test() -> Self {
        Self {
            retention: RetentionConfig::default(),
            pareto: ParetoConfig::default(),
            synthetic: SyntheticConfig {
                customers: 60,
                months: 6,
                ..SyntheticConfig::default()
            },
            scenario: ScenarioConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_section_defaults() {
        let json = r#"{ "retention": { "healthy_m1_pct": 60.0, "strong_avg_m1_pct": 65.0 } }"#;
        let cfg: InsightsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.retention.healthy_m1_pct, 60.0);
        assert_eq!(cfg.pareto.dimension, Dimension::Genre);
        assert_eq!(cfg.synthetic.months, 12);
        assert_eq!(cfg.scenario.mau_growth_pct, 8.0);
    }

    #[test]
    fn partial_pareto_section_keeps_alert_defaults() {
        let json = r#"{ "pareto": { "dimension": "publisher" } }"#;
        let cfg: InsightsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.pareto.dimension, Dimension::Publisher);
        assert_eq!(cfg.pareto.target_share_pct, 80.0);
        assert_eq!(cfg.pareto.concentration_alert_pct, 75.0);
        assert_eq!(cfg.pareto.customer_concentration_alert_pct, 60.0);
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        let err = InsightsConfig::load("/nonexistent/insights-data").unwrap_err();
        assert!(err.to_string().contains("insights_config.json"));
    }
}
