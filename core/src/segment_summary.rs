//! Per-segment rollup of RFM results: headcount, value, and share.

use crate::{
    rfm_engine::{CustomerRfm, Segment},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub segment:            Segment,
    pub customers:          usize,
    pub total_monetary:     f64,
    pub avg_monetary:       f64,
    pub customer_share_pct: f64,
    pub playbook:           String,
}

/// Summarise scored customers by segment.
///
/// Sorted by total value descending, ties by rule precedence.
/// Segments with no customers are left out.
pub fn summarize_segments(scored: &BTreeMap<CustomerId, CustomerRfm>) -> Vec<SegmentSummary> {
    let total_customers = scored.len();
    let mut acc: BTreeMap<Segment, (usize, f64)> = BTreeMap::new();
    for rfm in scored.values() {
        let slot = acc.entry(rfm.segment).or_insert((0, 0.0));
        slot.0 += 1;
        slot.1 += rfm.monetary;
    }

    let mut rows: Vec<SegmentSummary> = acc
        .into_iter()
        .map(|(segment, (customers, total_monetary))| SegmentSummary {
            segment,
            customers,
            total_monetary,
            avg_monetary: total_monetary / customers as f64,
            customer_share_pct: customers as f64 / total_customers as f64 * 100.0,
            playbook: segment.playbook().to_string(),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_monetary
            .total_cmp(&a.total_monetary)
            .then_with(|| a.segment.precedence().cmp(&b.segment.precedence()))
    });
    rows
}
