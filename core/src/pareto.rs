//! Revenue concentration by a categorical dimension (the 80/20 view).

use crate::{
    config::ParetoConfig,
    error::{InsightsError, InsightsResult},
    purchase::{validate_all, PurchaseRecord},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Key used for records that do not carry the grouped attribute.
pub const UNKNOWN_KEY: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Genre,
    Publisher,
    Region,
    Customer,
}

impl Dimension {
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Genre     => "genre",
            Dimension::Publisher => "publisher",
            Dimension::Region    => "region",
            Dimension::Customer  => "customer",
        }
    }

    fn attr<'a>(&self, r: &'a PurchaseRecord) -> Option<&'a str> {
        match self {
            Dimension::Genre     => r.genre.as_deref(),
            Dimension::Publisher => r.publisher.as_deref(),
            Dimension::Region    => r.region.as_deref(),
            Dimension::Customer  => Some(r.customer_id.as_str()),
        }
    }
}

impl FromStr for Dimension {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genre"     => Ok(Dimension::Genre),
            "publisher" => Ok(Dimension::Publisher),
            "region"    => Ok(Dimension::Region),
            "customer"  => Ok(Dimension::Customer),
            other       => Err(InsightsError::UnknownDimension { name: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoEntry {
    pub key:            String,
    pub revenue:        f64,
    pub cumulative:     f64,
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoBreakdown {
    pub dimension:     Dimension,
    pub total_revenue: f64,
    pub entries:       Vec<ParetoEntry>,
}

impl ParetoBreakdown {
    /// Leading keys needed for the cumulative share to reach `pct`.
    /// All keys if the share is never reached.
    pub fn keys_for_share(&self, pct: f64) -> usize {
        self.entries
            .iter()
            .position(|e| e.cumulative_pct >= pct)
            .map(|i| i + 1)
            .unwrap_or(self.entries.len())
    }
}

/// Group revenue by `dimension`, largest first (ties by key).
pub fn pareto_by(records: &[PurchaseRecord], dimension: Dimension) -> InsightsResult<ParetoBreakdown> {
    validate_all(records)?;
    Ok(pareto_validated(records, dimension))
}

pub(crate) fn pareto_validated(records: &[PurchaseRecord], dimension: Dimension) -> ParetoBreakdown {
    let ranked = ranked_revenue(records, |r| Some(dimension.attr(r).unwrap_or(UNKNOWN_KEY)));

    let total_revenue: f64 = ranked.iter().map(|(_, v)| v).sum();
    let mut cumulative = 0.0;
    let entries = ranked
        .into_iter()
        .map(|(key, value)| {
            cumulative += value;
            let cumulative_pct = if total_revenue > 0.0 {
                cumulative / total_revenue * 100.0
            } else {
                0.0
            };
            ParetoEntry {
                key: key.to_string(),
                revenue: value,
                cumulative,
                cumulative_pct,
            }
        })
        .collect();

    ParetoBreakdown { dimension, total_revenue, entries }
}

/// Revenue per key, largest first (ties by key). Records for which `key`
/// returns `None` are left out.
fn ranked_revenue<'a, F>(records: &'a [PurchaseRecord], key: F) -> Vec<(&'a str, f64)>
where
    F: Fn(&'a PurchaseRecord) -> Option<&'a str>,
{
    let mut revenue: BTreeMap<&str, f64> = BTreeMap::new();
    for r in records {
        if let Some(k) = key(r) {
            *revenue.entry(k).or_insert(0.0) += r.net_revenue;
        }
    }

    let mut ranked: Vec<(&str, f64)> = revenue.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

// ── Concentration headlines ──────────────────────────────────────────────────

/// Revenue share held by the top slice of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    pub dimension:         Dimension,
    /// How many leading keys make up the top slice.
    pub top_keys:          usize,
    pub top_revenue:       f64,
    /// Share of all revenue, 0 when total revenue is 0.
    pub revenue_share_pct: f64,
    pub concentrated:      bool,
    pub headline:          String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationSummary {
    pub publisher: Concentration,
    pub genre:     Concentration,
    pub customer:  Concentration,
}

/// Top 20% of publishers and genres, and the top tenth of the record count
/// in customers, against the whole record set's revenue.
pub fn concentration_summary(
    records: &[PurchaseRecord],
    config: &ParetoConfig,
) -> InsightsResult<ConcentrationSummary> {
    validate_all(records)?;
    Ok(concentration_validated(records, config))
}

pub(crate) fn concentration_validated(
    records: &[PurchaseRecord],
    config: &ParetoConfig,
) -> ConcentrationSummary {
    let total: f64 = records.iter().map(|r| r.net_revenue).sum();

    let publisher = concentration(records, Dimension::Publisher, |n| n / 5, total);
    let genre = concentration(records, Dimension::Genre, |n| n / 5, total);
    let customer = concentration(records, Dimension::Customer, |_| records.len() / 10, total);

    ConcentrationSummary {
        publisher: publisher.labelled(
            publisher.revenue_share_pct > config.concentration_alert_pct,
            "Highly concentrated - focus on top performers.",
            "Balanced distribution across publishers.",
        ),
        genre: genre.labelled(
            genre.revenue_share_pct > config.concentration_alert_pct,
            "Strong focus on few genres",
            "Diverse genre portfolio",
        ),
        customer: customer.labelled(
            customer.revenue_share_pct > config.customer_concentration_alert_pct,
            "VIP customer focus essential",
            "Healthy customer distribution",
        ),
    }
}

/// `top_keys` maps the number of distinct keys to the size of the slice.
fn concentration<F>(
    records: &[PurchaseRecord],
    dimension: Dimension,
    top_keys: F,
    total_revenue: f64,
) -> Concentration
where
    F: Fn(usize) -> usize,
{
    let ranked = ranked_revenue(records, |r| dimension.attr(r));
    let top_keys = top_keys(ranked.len()).min(ranked.len());
    let top_revenue: f64 = ranked.iter().take(top_keys).map(|(_, v)| v).sum();
    let revenue_share_pct = if total_revenue > 0.0 {
        top_revenue / total_revenue * 100.0
    } else {
        0.0
    };

    Concentration {
        dimension,
        top_keys,
        top_revenue,
        revenue_share_pct,
        concentrated: false,
        headline: String::new(),
    }
}

impl Concentration {
    fn labelled(&self, concentrated: bool, high: &str, low: &str) -> Self {
        let headline = if concentrated { high } else { low };
        Self {
            concentrated,
            headline: headline.to_string(),
            ..self.clone()
        }
    }
}
