//! Player insights core: RFM segmentation, cohort retention, and the
//! supporting KPIs a storefront dashboard renders.

pub mod cohort_engine;
pub mod config;
pub mod engine;
pub mod error;
pub mod overview;
pub mod pareto;
pub mod purchase;
pub mod quantile;
pub mod report;
pub mod retention_summary;
pub mod rfm_engine;
pub mod rng;
pub mod scenario;
pub mod segment_summary;
pub mod synthetic;
pub mod types;
