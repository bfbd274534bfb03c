//! The insights report: every analysis over one record snapshot, as JSON.

use crate::{
    cohort_engine::CohortTable,
    error::InsightsResult,
    overview::DatasetOverview,
    pareto::{ConcentrationSummary, ParetoBreakdown},
    retention_summary::RetentionSummary,
    rfm_engine::CustomerRfm,
    scenario::ScenarioProjection,
    segment_summary::SegmentSummary,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    pub overview:  DatasetOverview,
    /// One row per customer, ordered by customer id.
    pub customers: Vec<CustomerRfm>,
    pub segments:  Vec<SegmentSummary>,
    pub cohorts:   CohortTable,
    pub retention: RetentionSummary,
    pub pareto:    ParetoBreakdown,
    /// Leading pareto keys needed to reach the configured revenue share.
    pub pareto_keys_for_target: usize,
    pub concentration: ConcentrationSummary,
    pub scenario:      ScenarioProjection,
}

impl InsightsReport {
    pub fn to_json(&self) -> InsightsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> InsightsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
