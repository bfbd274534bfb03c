//! What-if projection from current revenue and MAU.
//!
//! Both levers add a share of current revenue; MAU growth also scales MAU.
//! Projected values never go below 0.

use crate::{config::ScenarioConfig, overview::DatasetOverview};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub current_revenue:  f64,
    pub current_mau:      f64,
    /// Revenue per average monthly active user.
    pub current_clv:      f64,
    pub scenario_revenue: f64,
    pub scenario_mau:     f64,
    pub scenario_clv:     f64,
}

pub fn project(overview: &DatasetOverview, config: &ScenarioConfig) -> ScenarioProjection {
    let current_revenue = overview.total_revenue;
    let current_mau = overview.avg_mau;

    let price_impact = config.price_increase_pct / 100.0 * current_revenue;
    let mau_impact = config.mau_growth_pct / 100.0 * current_revenue;

    let scenario_revenue = (current_revenue + price_impact + mau_impact).max(0.0);
    let scenario_mau = (current_mau * (1.0 + config.mau_growth_pct / 100.0)).max(0.0);

    ScenarioProjection {
        current_revenue,
        current_mau,
        current_clv: per_user(current_revenue, current_mau),
        scenario_revenue,
        scenario_mau,
        scenario_clv: per_user(scenario_revenue, scenario_mau),
    }
}

fn per_user(revenue: f64, mau: f64) -> f64 {
    if mau > 0.0 {
        revenue / mau
    } else {
        0.0
    }
}
