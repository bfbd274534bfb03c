//! RFM segmentation engine — recency/frequency/monetary scoring per customer.
//!
//! This engine:
//!   1. Groups purchase records by customer
//!   2. Measures recency against the latest purchase in the whole input
//!   3. Scores each dimension 1..5 by quintile (recency inverted)
//!   4. Classifies each customer into a segment by ordered rules
//!
//! Pure: same records in, same scores out. No state survives a call.

use crate::{
    error::InsightsResult,
    purchase::{validate_all, PurchaseRecord},
    quantile::{quintile_bins, rank_first, Binning},
    types::CustomerId,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "Champions")]
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Churned")]
    Churned,
    #[serde(rename = "Need Attention")]
    NeedAttention,
    #[serde(rename = "Potential")]
    Potential,
}

impl Segment {
    /// Every segment, in rule precedence order.
    pub const ALL: [Segment; 6] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::AtRisk,
        Segment::Churned,
        Segment::NeedAttention,
        Segment::Potential,
    ];

    /// First matching rule wins. The rules overlap, so order matters.
    pub fn classify(r: u8, f: u8, m: u8) -> Self {
        if r >= 4 && f >= 4 && m >= 4 {
            Segment::Champions
        } else if r >= 3 && f >= 3 && m >= 3 {
            Segment::LoyalCustomers
        } else if r >= 4 && f <= 2 {
            Segment::AtRisk
        } else if r <= 2 && f >= 3 {
            Segment::Churned
        } else if r >= 3 && f <= 2 {
            Segment::NeedAttention
        } else {
            Segment::Potential
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Champions      => "Champions",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::AtRisk         => "At Risk",
            Segment::Churned        => "Churned",
            Segment::NeedAttention  => "Need Attention",
            Segment::Potential      => "Potential",
        }
    }

    /// Suggested follow-up for customers in this segment.
    pub fn playbook(&self) -> &'static str {
        match self {
            Segment::Champions      => "VIP treatment and exclusive perks",
            Segment::LoyalCustomers => "Retention programs and upsell opportunities",
            Segment::AtRisk         => "Win-back campaigns and special offers",
            Segment::Churned        => "Re-engagement campaigns and churn surveys",
            Segment::NeedAttention  => "Engagement campaigns and personalized offers",
            Segment::Potential      => "Nurture and convert",
        }
    }

    pub fn precedence(&self) -> usize {
        Segment::ALL.iter().position(|s| s == self).unwrap_or(Segment::ALL.len())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRfm {
    pub customer_id:   CustomerId,
    pub last_purchase: NaiveDateTime,
    pub recency_days:  i64,
    pub frequency:     i64,
    pub monetary:      f64,
    pub r_score:       u8,
    pub f_score:       u8,
    pub m_score:       u8,
    pub segment:       Segment,
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct CustomerTotals {
    last_purchase: NaiveDateTime,
    frequency:     i64,
    monetary:      f64,
}

/// Score every distinct customer in `records`.
///
/// Fails with `InvalidInput` if any record breaks the field contract.
/// An empty slice yields an empty map.
pub fn score_customers(
    records: &[PurchaseRecord],
) -> InsightsResult<BTreeMap<CustomerId, CustomerRfm>> {
    validate_all(records)?;
    Ok(score_validated(records))
}

/// Scoring over records already checked by `validate_all`.
pub(crate) fn score_validated(records: &[PurchaseRecord]) -> BTreeMap<CustomerId, CustomerRfm> {
    let Some(global_max) = records.iter().map(|r| r.purchase_date).max() else {
        return BTreeMap::new();
    };

    let totals = group_by_customer(records);

    // Column vectors in customer-id order; the f-score tie-break relies on it.
    let recency: Vec<f64> = totals
        .values()
        .map(|t| (global_max - t.last_purchase).num_days() as f64)
        .collect();
    let frequency: Vec<f64> = totals.values().map(|t| t.frequency as f64).collect();
    let monetary: Vec<f64> = totals.values().map(|t| t.monetary).collect();

    let n = totals.len();
    let r_bins = bins_or_neutral("recency", quintile_bins(&recency), n);
    let f_bins = bins_or_neutral("frequency", quintile_bins(&rank_first(&frequency)), n);
    let m_bins = bins_or_neutral("monetary", quintile_bins(&monetary), n);

    let scored: BTreeMap<CustomerId, CustomerRfm> = totals
        .into_iter()
        .enumerate()
        .map(|(i, (customer_id, t))| {
            // Recency is inverted: the most recent quintile scores 5.
            let r_score = 6 - r_bins[i];
            let f_score = f_bins[i];
            let m_score = m_bins[i];
            let rfm = CustomerRfm {
                customer_id: customer_id.to_string(),
                last_purchase: t.last_purchase,
                recency_days: recency[i] as i64,
                frequency: t.frequency,
                monetary: t.monetary,
                r_score,
                f_score,
                m_score,
                segment: Segment::classify(r_score, f_score, m_score),
            };
            (customer_id.to_string(), rfm)
        })
        .collect();

    log::debug!(
        "rfm: scored {} customers from {} records (reference={global_max})",
        scored.len(),
        records.len(),
    );

    scored
}

fn group_by_customer(records: &[PurchaseRecord]) -> BTreeMap<&str, CustomerTotals> {
    let mut totals: BTreeMap<&str, CustomerTotals> = BTreeMap::new();
    for r in records {
        totals
            .entry(r.customer_id.as_str())
            .and_modify(|t| {
                t.last_purchase = t.last_purchase.max(r.purchase_date);
                t.frequency = t.frequency.checked_add(r.games_purchased).unwrap_or_else(|| {
                    log::warn!(
                        "rfm: games total for {} exceeds i64; saturating frequency",
                        r.customer_id
                    );
                    i64::MAX
                });
                t.monetary += r.net_revenue;
            })
            .or_insert(CustomerTotals {
                last_purchase: r.purchase_date,
                frequency:     r.games_purchased,
                monetary:      r.net_revenue,
            });
    }
    totals
}

fn bins_or_neutral(dimension: &str, binning: Binning, len: usize) -> Vec<u8> {
    if binning == Binning::InsufficientData {
        log::debug!("rfm: {dimension} has fewer than 2 distinct values; using neutral score");
    }
    binning.or_neutral(len)
}
