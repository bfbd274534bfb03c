//! Cohort retention engine — monthly cohorts by first purchase.
//!
//! A customer's cohort is the month of their first purchase across all
//! records. A cell `(cohort, period)` counts the distinct cohort members
//! with at least one purchase in `period`. Storage is sparse; callers walk
//! it densely through the sorted cohort and period axes.
//!
//! Invariants of an unfiltered build:
//!   - no member appears in a period before their cohort month
//!   - every member is active in their cohort month, so
//!     `retained(c, c) == cohort_size(c)`

use crate::{
    error::InsightsResult,
    purchase::{validate_all, PurchaseRecord},
    types::MonthKey,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortCell {
    pub cohort:        MonthKey,
    pub period:        MonthKey,
    pub retained:      usize,
    pub retention_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortMatrix {
    cohort_sizes: BTreeMap<MonthKey, usize>,
    retained:     BTreeMap<(MonthKey, MonthKey), usize>,
    periods:      Vec<MonthKey>,
}

/// Dense, serializable rendering of a matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortTable {
    pub periods: Vec<MonthKey>,
    pub rows:    Vec<CohortRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRow {
    pub cohort:        MonthKey,
    pub cohort_size:   usize,
    pub retained:      Vec<usize>,
    pub retention_pct: Vec<f64>,
}

// ── Construction ─────────────────────────────────────────────────────────────

impl CohortMatrix {
    /// Build the matrix over every record.
    pub fn build(records: &[PurchaseRecord]) -> InsightsResult<Self> {
        Self::build_filtered(records, |_| true)
    }

    /// Build over the records matching `keep`, with cohorts still assigned
    /// from each customer's first purchase across *all* records.
    ///
    /// Cohorts appear only if some kept record maps to them. The
    /// `retained(c, c) == cohort_size(c)` invariant need not hold here:
    /// a member's kept records may all fall after their cohort month.
    pub fn build_filtered<F>(records: &[PurchaseRecord], keep: F) -> InsightsResult<Self>
    where
        F: Fn(&PurchaseRecord) -> bool,
    {
        validate_all(records)?;
        Ok(Self::from_validated(records, keep))
    }

    pub(crate) fn from_validated<F>(records: &[PurchaseRecord], keep: F) -> Self
    where
        F: Fn(&PurchaseRecord) -> bool,
    {
        let mut first_month: HashMap<&str, MonthKey> = HashMap::new();
        for r in records {
            let month = MonthKey::of(&r.purchase_date);
            first_month
                .entry(r.customer_id.as_str())
                .and_modify(|m| *m = (*m).min(month))
                .or_insert(month);
        }

        let mut members: BTreeMap<MonthKey, BTreeSet<&str>> = BTreeMap::new();
        let mut active: BTreeMap<(MonthKey, MonthKey), BTreeSet<&str>> = BTreeMap::new();
        let mut periods: BTreeSet<MonthKey> = BTreeSet::new();

        for r in records.iter().filter(|r| keep(r)) {
            let Some(&cohort) = first_month.get(r.customer_id.as_str()) else {
                continue;
            };
            let period = MonthKey::of(&r.purchase_date);
            members.entry(cohort).or_default().insert(r.customer_id.as_str());
            active.entry((cohort, period)).or_default().insert(r.customer_id.as_str());
            periods.insert(period);
        }

        let matrix = Self {
            cohort_sizes: members.into_iter().map(|(c, ids)| (c, ids.len())).collect(),
            retained:     active.into_iter().map(|(k, ids)| (k, ids.len())).collect(),
            periods:      periods.into_iter().collect(),
        };

        log::debug!(
            "cohort: {} cohorts x {} periods from {} customers",
            matrix.cohort_sizes.len(),
            matrix.periods.len(),
            first_month.len(),
        );

        matrix
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

impl CohortMatrix {
    pub fn is_empty(&self) -> bool {
        self.cohort_sizes.is_empty()
    }

    /// Cohort axis, oldest first.
    pub fn cohorts(&self) -> Vec<MonthKey> {
        self.cohort_sizes.keys().copied().collect()
    }

    /// Period axis, oldest first. Only months with at least one purchase.
    pub fn periods(&self) -> &[MonthKey] {
        &self.periods
    }

    pub fn latest_cohort(&self) -> Option<MonthKey> {
        self.cohort_sizes.keys().next_back().copied()
    }

    pub fn cohort_size(&self, cohort: MonthKey) -> usize {
        self.cohort_sizes.get(&cohort).copied().unwrap_or(0)
    }

    pub fn retained(&self, cohort: MonthKey, period: MonthKey) -> usize {
        self.retained.get(&(cohort, period)).copied().unwrap_or(0)
    }

    /// Percentage of the cohort active in `period`. 0 for an empty cohort.
    pub fn retention_pct(&self, cohort: MonthKey, period: MonthKey) -> f64 {
        let size = self.cohort_size(cohort);
        if size == 0 {
            return 0.0;
        }
        self.retained(cohort, period) as f64 / size as f64 * 100.0
    }

    /// One cell per period column, zero-filled.
    pub fn row(&self, cohort: MonthKey) -> Vec<CohortCell> {
        self.periods
            .iter()
            .map(|&period| CohortCell {
                cohort,
                period,
                retained: self.retained(cohort, period),
                retention_pct: self.retention_pct(cohort, period),
            })
            .collect()
    }

    /// Every row in cohort order.
    pub fn rows(&self) -> impl Iterator<Item = (MonthKey, Vec<CohortCell>)> + '_ {
        self.cohort_sizes.keys().map(move |&c| (c, self.row(c)))
    }

    /// Non-zero cells only, in `(cohort, period)` order.
    pub fn cells(&self) -> impl Iterator<Item = CohortCell> + '_ {
        self.retained.iter().map(move |(&(cohort, period), &retained)| CohortCell {
            cohort,
            period,
            retained,
            retention_pct: self.retention_pct(cohort, period),
        })
    }

    /// Retention `age_months` after the cohort month.
    ///
    /// `None` for an unknown cohort or when that month lies after the last
    /// observed period.
    pub fn retention_at_age(&self, cohort: MonthKey, age_months: u32) -> Option<f64> {
        if !self.cohort_sizes.contains_key(&cohort) {
            return None;
        }
        let period = cohort.plus_months(age_months);
        let last = self.periods.last()?;
        if period > *last {
            return None;
        }
        Some(self.retention_pct(cohort, period))
    }

    /// Cohort-relative retention from age 0 to the last observed period.
    pub fn age_curve(&self, cohort: MonthKey) -> Vec<f64> {
        let Some(last) = self.periods.last() else {
            return Vec::new();
        };
        if !self.cohort_sizes.contains_key(&cohort) {
            return Vec::new();
        }
        let span = cohort.months_until(last);
        if span < 0 {
            return Vec::new();
        }
        (0..=span as u32)
            .map(|age| self.retention_pct(cohort, cohort.plus_months(age)))
            .collect()
    }

    pub fn to_table(&self) -> CohortTable {
        let rows = self
            .rows()
            .map(|(cohort, cells)| CohortRow {
                cohort,
                cohort_size: self.cohort_size(cohort),
                retained: cells.iter().map(|c| c.retained).collect(),
                retention_pct: cells.iter().map(|c| c.retention_pct).collect(),
            })
            .collect();
        CohortTable { periods: self.periods.clone(), rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn buy(id: &str, y: i32, m: u32, d: u32) -> PurchaseRecord {
        PurchaseRecord::on(id, NaiveDate::from_ymd_opt(y, m, d).unwrap(), 9.99, 1)
    }

    #[test]
    fn unknown_cohort_reads_as_zero() {
        let matrix = CohortMatrix::build(&[buy("a", 2024, 1, 3)]).unwrap();
        let dec = MonthKey::new(2023, 12);
        assert_eq!(matrix.cohort_size(dec), 0);
        assert_eq!(matrix.retention_pct(dec, MonthKey::new(2024, 1)), 0.0);
        assert_eq!(matrix.retention_at_age(dec, 0), None);
    }

    #[test]
    fn age_curve_spans_gap_months() {
        let records = [buy("a", 2024, 1, 3), buy("a", 2024, 3, 9)];
        let matrix = CohortMatrix::build(&records).unwrap();
        let jan = MonthKey::new(2024, 1);
        assert_eq!(matrix.age_curve(jan), vec![100.0, 0.0, 100.0]);
        assert_eq!(matrix.retention_at_age(jan, 3), None);
    }

    #[test]
    fn empty_input_builds_empty_matrix() {
        let matrix = CohortMatrix::build(&[]).unwrap();
        assert!(matrix.is_empty());
        assert!(matrix.periods().is_empty());
        assert_eq!(matrix.latest_cohort(), None);
    }
}
