//! The insights engine — runs every analysis over one record snapshot.
//!
//! EXECUTION ORDER (fixed):
//!   1. Validate the snapshot once
//!   2. Dataset overview
//!   3. RFM scoring, then segment summary
//!   4. Cohort matrix, then retention summary
//!   5. Pareto concentration on the configured dimension, then the
//!      publisher, genre and customer concentration headlines
//!   6. What-if projection from the overview
//!
//! RULES:
//!   - The snapshot is borrowed immutably and never modified.
//!   - RFM and cohort stages do not read each other's output.
//!   - No stage performs I/O.

use crate::{
    cohort_engine::CohortMatrix,
    config::InsightsConfig,
    error::InsightsResult,
    overview::overview,
    pareto::{concentration_validated, pareto_validated},
    purchase::{validate_all, PurchaseRecord},
    report::InsightsReport,
    retention_summary::summarize_retention,
    rfm_engine::score_validated,
    scenario::project,
    segment_summary::summarize_segments,
};

pub struct InsightsEngine {
    config: InsightsConfig,
}

impl InsightsEngine {
    pub fn new(config: InsightsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    /// Run every analysis. Fails only on `InvalidInput`; an empty snapshot
    /// produces an empty report.
    pub fn run(&self, records: &[PurchaseRecord]) -> InsightsResult<InsightsReport> {
        validate_all(records)?;

        let overview = overview(records);

        let scored = score_validated(records);
        let segments = summarize_segments(&scored);

        let matrix = CohortMatrix::from_validated(records, |_| true);
        let retention = summarize_retention(&matrix, &self.config.retention);

        let pareto = pareto_validated(records, self.config.pareto.dimension);
        let pareto_keys_for_target = pareto.keys_for_share(self.config.pareto.target_share_pct);
        let concentration = concentration_validated(records, &self.config.pareto);

        let scenario = project(&overview, &self.config.scenario);

        log::info!(
            "insights: {} records, {} customers, {} segments, {} cohorts, mau={:.1}, arpu={:.2}",
            overview.records,
            overview.unique_customers,
            segments.len(),
            matrix.cohorts().len(),
            overview.avg_mau,
            overview.arpu,
        );

        Ok(InsightsReport {
            overview,
            customers: scored.into_values().collect(),
            segments,
            cohorts: matrix.to_table(),
            retention,
            pareto,
            pareto_keys_for_target,
            concentration,
            scenario,
        })
    }

    /// Cohort retention restricted to one genre. Cohorts still come from
    /// each customer's first purchase in any genre.
    pub fn genre_cohorts(
        &self,
        records: &[PurchaseRecord],
        genre: &str,
    ) -> InsightsResult<CohortMatrix> {
        CohortMatrix::build_filtered(records, |r| r.genre.as_deref() == Some(genre))
    }
}
