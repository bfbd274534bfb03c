//! Dataset overview — headline numbers for the filtered record set.
//!
//! Monthly figures only cover calendar months with at least one purchase.

use crate::{purchase::PurchaseRecord, types::MonthKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Added to the previous month's revenue before dividing, so a zero month
/// does not produce an infinite growth rate.
const GROWTH_DENOMINATOR_GUARD: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month:            MonthKey,
    pub revenue:          f64,
    pub active_customers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub records:               usize,
    pub unique_customers:      usize,
    pub date_range_days:       i64,
    pub total_revenue:         f64,
    pub avg_transaction_value: f64,
    /// Mean distinct customers per active month.
    pub avg_mau:               f64,
    /// Total revenue over average MAU.
    pub arpu:                  f64,
    pub revenue_per_customer:  f64,
    /// Last month against the one before it. 0 with fewer than two months.
    pub revenue_growth_pct:    f64,
    /// Oldest month first.
    pub monthly_revenue:       Vec<MonthlyRevenue>,
}

/// Empty input gives all zeros.
pub fn overview(records: &[PurchaseRecord]) -> DatasetOverview {
    let (Some(first), Some(last)) = (
        records.iter().map(|r| r.purchase_date).min(),
        records.iter().map(|r| r.purchase_date).max(),
    ) else {
        return DatasetOverview::default();
    };

    let unique_customers = records
        .iter()
        .map(|r| r.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let total_revenue: f64 = records.iter().map(|r| r.net_revenue).sum();

    let monthly_revenue = monthly_series(records);
    let avg_mau = monthly_revenue
        .iter()
        .map(|m| m.active_customers as f64)
        .sum::<f64>()
        / monthly_revenue.len() as f64;

    DatasetOverview {
        records: records.len(),
        unique_customers,
        date_range_days: (last - first).num_days(),
        total_revenue,
        avg_transaction_value: total_revenue / records.len() as f64,
        avg_mau,
        arpu: if avg_mau > 0.0 { total_revenue / avg_mau } else { 0.0 },
        revenue_per_customer: total_revenue / unique_customers as f64,
        revenue_growth_pct: revenue_growth_pct(&monthly_revenue),
        monthly_revenue,
    }
}

fn monthly_series(records: &[PurchaseRecord]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<MonthKey, (f64, HashSet<&str>)> = BTreeMap::new();
    for r in records {
        let (revenue, customers) = months.entry(MonthKey::of(&r.purchase_date)).or_default();
        *revenue += r.net_revenue;
        customers.insert(r.customer_id.as_str());
    }
    months
        .into_iter()
        .map(|(month, (revenue, customers))| MonthlyRevenue {
            month,
            revenue,
            active_customers: customers.len(),
        })
        .collect()
}

fn revenue_growth_pct(series: &[MonthlyRevenue]) -> f64 {
    match series {
        [.., prev, last] => {
            (last.revenue - prev.revenue) / (prev.revenue + GROWTH_DENOMINATOR_GUARD) * 100.0
        }
        _ => 0.0,
    }
}
