//! Headline retention metrics derived from a cohort matrix.
//!
//! Ages are cohort-relative: M1 is the month after a cohort's join month,
//! whatever calendar month that is.

use crate::{cohort_engine::CohortMatrix, config::RetentionConfig, types::MonthKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionSummary {
    pub latest_cohort:      Option<MonthKey>,
    pub latest_cohort_size: usize,
    pub latest_m1_pct:      Option<f64>,
    pub latest_m3_pct:      Option<f64>,
    /// Mean M1 retention over cohorts old enough to have one.
    pub avg_m1_pct:         Option<f64>,
    pub latest_m1_label:    Option<String>,
    pub avg_m1_label:       Option<String>,
}

pub fn summarize_retention(matrix: &CohortMatrix, config: &RetentionConfig) -> RetentionSummary {
    let latest_cohort = matrix.latest_cohort();
    let latest_m1_pct = latest_cohort.and_then(|c| matrix.retention_at_age(c, 1));
    let latest_m3_pct = latest_cohort.and_then(|c| matrix.retention_at_age(c, 3));

    let m1: Vec<f64> = matrix
        .cohorts()
        .into_iter()
        .filter_map(|c| matrix.retention_at_age(c, 1))
        .collect();
    let avg_m1_pct = if m1.is_empty() {
        None
    } else {
        Some(m1.iter().sum::<f64>() / m1.len() as f64)
    };

    let latest_m1_label = latest_m1_pct
        .map(|p| label(p > config.healthy_m1_pct, "Healthy", "At Risk"));
    let avg_m1_label = avg_m1_pct
        .map(|p| label(p > config.strong_avg_m1_pct, "Strong", "Needs Focus"));

    RetentionSummary {
        latest_cohort,
        latest_cohort_size: latest_cohort.map(|c| matrix.cohort_size(c)).unwrap_or(0),
        latest_m1_pct,
        latest_m3_pct,
        avg_m1_pct,
        latest_m1_label,
        avg_m1_label,
    }
}

fn label(good: bool, pass: &str, fail: &str) -> String {
    let text = if good { pass } else { fail };
    text.to_string()
}
