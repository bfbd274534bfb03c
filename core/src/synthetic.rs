//! Deterministic synthetic purchase history.
//!
//! Each customer joins in a random month of the window and always buys in
//! that month. In every later month they buy again with a probability that
//! decays geometrically with their age. Basket value is Pareto-distributed
//! and capped. Same seed + same config = identical records.

use crate::{
    config::SyntheticConfig,
    purchase::PurchaseRecord,
    rng::{SeededRng, Stream},
    types::MonthKey,
};
use chrono::{NaiveDate, NaiveTime};

const GENRES: &[&str] = &[
    "Action", "Adventure", "RPG", "Strategy", "Simulation", "Sports", "Puzzle", "Indie",
];

const PUBLISHERS: &[&str] = &[
    "Northwind Interactive", "Lumen Forge", "Crimson Pixel", "Tidewater Games",
    "Ironbark Studios", "Blue Comet", "Halcyon Works",
];

const REGIONS: &[&str] = &["North America", "Europe", "Asia", "South America", "Oceania"];

/// Probability a purchase is in the customer's favourite genre.
const GENRE_LOYALTY: f64 = 0.70;

struct CustomerProfile {
    customer_id:     String,
    join_offset:     u32,
    favourite_genre: &'static str,
    region:          &'static str,
}

pub struct SyntheticPurchases;

impl SyntheticPurchases {
    pub fn generate(seed: u64, config: &SyntheticConfig) -> Vec<PurchaseRecord> {
        let mut customer_rng = SeededRng::new(seed, Stream::Customers);
        let mut purchase_rng = SeededRng::new(seed, Stream::Purchases);
        let start = MonthKey::of(&config.start_date.and_time(NaiveTime::default()));
        let months = config.months.max(1);

        let mut records = Vec::new();
        for i in 0..config.customers {
            let profile = CustomerProfile {
                customer_id:     format!("c-{i:06}"),
                join_offset:     customer_rng.next_u64_below(months as u64) as u32,
                favourite_genre: *customer_rng.pick(GENRES),
                region:          *customer_rng.pick(REGIONS),
            };

            for offset in profile.join_offset..months {
                let age = offset - profile.join_offset;
                let buys = age == 0 || {
                    let p = config.monthly_activity * config.activity_decay.powi(age as i32 - 1);
                    purchase_rng.chance(p)
                };
                if !buys {
                    continue;
                }
                if let Some(record) =
                    Self::purchase(&profile, start.plus_months(offset), config, &mut purchase_rng)
                {
                    records.push(record);
                }
            }
        }

        log::debug!(
            "synthetic: {} records for {} customers over {months} months (seed={seed})",
            records.len(),
            config.customers,
        );

        records
    }

    fn purchase(
        profile: &CustomerProfile,
        month: MonthKey,
        config: &SyntheticConfig,
        rng: &mut SeededRng,
    ) -> Option<PurchaseRecord> {
        let day = 1 + rng.next_u64_below(28) as u32;
        let hour = rng.next_u64_below(24) as u32;
        let minute = rng.next_u64_below(60) as u32;
        let date = NaiveDate::from_ymd_opt(month.year, month.month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;

        let raw = rng
            .pareto(config.revenue_pareto_xmin, config.revenue_pareto_alpha)
            .min(config.revenue_cap);
        let net_revenue = (raw * 100.0).round() / 100.0;
        let games = 1 + rng.next_u64_below(config.max_games_per_purchase.max(1)) as i64;

        let genre = if rng.chance(GENRE_LOYALTY) {
            profile.favourite_genre
        } else {
            *rng.pick(GENRES)
        };

        Some(
            PurchaseRecord::new(profile.customer_id.clone(), date.and_time(time), net_revenue, games)
                .with_genre(genre)
                .with_publisher(*rng.pick(PUBLISHERS))
                .with_region(profile.region),
        )
    }
}
