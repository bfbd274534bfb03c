use chrono::NaiveDate;
use insights_core::{
    config::{ParetoConfig, ScenarioConfig},
    error::InsightsError,
    overview::overview,
    pareto::{concentration_summary, pareto_by, Dimension, UNKNOWN_KEY},
    purchase::PurchaseRecord,
    scenario::project,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn catalogue() -> Vec<PurchaseRecord> {
    vec![
        PurchaseRecord::on("a", day(1, 1), 60.0, 1).with_genre("RPG").with_region("Europe"),
        PurchaseRecord::on("a", day(1, 20), 20.0, 1).with_genre("Action").with_region("Europe"),
        PurchaseRecord::on("b", day(2, 2), 10.0, 2).with_genre("RPG").with_region("Asia"),
        PurchaseRecord::on("c", day(3, 1), 10.0, 1).with_genre("Puzzle"),
    ]
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Ten records: one whale on publisher P1 / RPG with 80 of 100 revenue,
/// and eight small buyers spread over four more publishers and genres.
fn whale_catalogue() -> Vec<PurchaseRecord> {
    let genres = ["Action", "Puzzle", "Sports", "Racing"];
    let publishers = ["P2", "P3", "P4", "P5"];
    let mut records = vec![
        PurchaseRecord::on("whale", day(1, 3), 70.0, 1).with_genre("RPG").with_publisher("P1"),
        PurchaseRecord::on("whale", day(2, 3), 10.0, 1).with_genre("RPG").with_publisher("P1"),
    ];
    for i in 0..8 {
        records.push(
            PurchaseRecord::on(format!("small-{i}"), day(2, 10), 2.5, 1)
                .with_genre(genres[i % 4])
                .with_publisher(publishers[i % 4]),
        );
    }
    records
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Revenue is grouped, sorted descending, and accumulates to 100%.
#[test]
fn pareto_by_genre_sorted_and_cumulative() {
    let p = pareto_by(&catalogue(), Dimension::Genre).unwrap();
    let keys: Vec<&str> = p.entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["RPG", "Action", "Puzzle"]);
    assert_eq!(p.total_revenue, 100.0);
    assert_eq!(p.entries[0].revenue, 70.0);
    assert!((p.entries[0].cumulative_pct - 70.0).abs() < 1e-9);
    assert!((p.entries.last().unwrap().cumulative_pct - 100.0).abs() < 1e-9);

    assert_eq!(p.keys_for_share(70.0), 1);
    assert_eq!(p.keys_for_share(80.0), 2);
    assert_eq!(p.keys_for_share(100.0), 3);
}

/// Records without the attribute are grouped under "unknown".
#[test]
fn pareto_groups_missing_attribute_as_unknown() {
    let p = pareto_by(&catalogue(), Dimension::Region).unwrap();
    let unknown = p.entries.iter().find(|e| e.key == UNKNOWN_KEY).unwrap();
    assert_eq!(unknown.revenue, 10.0);
    // Asia and unknown tie at 10; ties sort by key.
    let keys: Vec<&str> = p.entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["Europe", "Asia", UNKNOWN_KEY]);
}

/// Zero total revenue yields zero cumulative shares, not NaN.
#[test]
fn pareto_zero_revenue_is_zero_share() {
    let records = vec![PurchaseRecord::on("a", day(1, 1), 0.0, 1)];
    let p = pareto_by(&records, Dimension::Customer).unwrap();
    assert_eq!(p.entries.len(), 1);
    assert_eq!(p.entries[0].cumulative_pct, 0.0);
}

/// Unknown dimension names are reported, not silently defaulted.
#[test]
fn dimension_parse() {
    assert_eq!("publisher".parse::<Dimension>().unwrap(), Dimension::Publisher);
    match "platform".parse::<Dimension>() {
        Err(InsightsError::UnknownDimension { name }) => assert_eq!(name, "platform"),
        other => panic!("expected UnknownDimension, got {other:?}"),
    }
}

/// Overview numbers: ARPU is revenue over average MAU, and revenue per
/// customer is reported separately.
#[test]
fn overview_headline_numbers() {
    let o = overview(&catalogue());
    assert_eq!(o.records, 4);
    assert_eq!(o.unique_customers, 3);
    assert_eq!(o.date_range_days, 60);
    assert_eq!(o.total_revenue, 100.0);
    assert_eq!(o.avg_transaction_value, 25.0);
    // One active customer in each of Jan, Feb and Mar.
    assert_eq!(o.avg_mau, 1.0);
    assert!(approx(o.arpu, 100.0));
    assert!(approx(o.revenue_per_customer, 100.0 / 3.0));
}

/// MAU averages distinct customers per active month; a customer buying
/// twice in one month counts once.
#[test]
fn mau_and_arpu_over_months() {
    let records = vec![
        PurchaseRecord::on("a", day(1, 2), 60.0, 1),
        PurchaseRecord::on("a", day(1, 9), 40.0, 1),
        PurchaseRecord::on("a", day(2, 2), 50.0, 1),
        PurchaseRecord::on("b", day(2, 5), 100.0, 1),
    ];
    let o = overview(&records);
    assert_eq!(o.avg_mau, 1.5);
    assert!(approx(o.arpu, 250.0 / 1.5));
    assert!(approx(o.revenue_per_customer, 125.0));
}

/// The monthly series covers active months only, oldest first.
#[test]
fn monthly_revenue_series() {
    let o = overview(&catalogue());
    let months: Vec<String> = o.monthly_revenue.iter().map(|m| m.month.to_string()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
    let revenue: Vec<f64> = o.monthly_revenue.iter().map(|m| m.revenue).collect();
    assert_eq!(revenue, vec![80.0, 10.0, 10.0]);
    assert!(o.monthly_revenue.iter().all(|m| m.active_customers == 1));
}

/// Growth compares the last two active months, with a small guard added to
/// the denominator.
#[test]
fn revenue_growth_last_two_months() {
    let records = vec![
        PurchaseRecord::on("a", day(1, 2), 100.0, 1),
        PurchaseRecord::on("b", day(2, 2), 150.0, 1),
    ];
    let o = overview(&records);
    assert!(approx(o.revenue_growth_pct, 50.0 / 100.001 * 100.0));

    // A zero-revenue month does not blow up the rate.
    let records = vec![
        PurchaseRecord::on("a", day(1, 2), 0.0, 1),
        PurchaseRecord::on("a", day(2, 2), 1.0, 1),
    ];
    let o = overview(&records);
    assert!(approx(o.revenue_growth_pct, 1.0 / 0.001 * 100.0));
}

/// A single active month has no growth.
#[test]
fn revenue_growth_single_month_is_zero() {
    let records = vec![
        PurchaseRecord::on("a", day(3, 2), 10.0, 1),
        PurchaseRecord::on("b", day(3, 20), 30.0, 1),
    ];
    let o = overview(&records);
    assert_eq!(o.revenue_growth_pct, 0.0);
    assert_eq!(o.monthly_revenue.len(), 1);
    assert_eq!(o.avg_mau, 2.0);
}

/// The top fifth of publishers and genres and the top tenth (by record
/// count) of customers are measured against total revenue.
#[test]
fn concentration_headlines_flag_whale() {
    let c = concentration_summary(&whale_catalogue(), &ParetoConfig::default()).unwrap();

    assert_eq!(c.publisher.top_keys, 1);
    assert!(approx(c.publisher.revenue_share_pct, 80.0));
    assert!(c.publisher.concentrated);
    assert_eq!(c.publisher.headline, "Highly concentrated - focus on top performers.");

    assert_eq!(c.genre.top_keys, 1);
    assert!(approx(c.genre.revenue_share_pct, 80.0));
    assert_eq!(c.genre.headline, "Strong focus on few genres");

    // Ten records, so the top slice is one customer.
    assert_eq!(c.customer.top_keys, 1);
    assert!(approx(c.customer.top_revenue, 80.0));
    assert!(c.customer.concentrated);
    assert_eq!(c.customer.headline, "VIP customer focus essential");
}

/// Evenly spread revenue stays under the alert thresholds, and records
/// without a genre are left out of the genre count.
#[test]
fn concentration_headlines_balanced() {
    let genres = ["Action", "Puzzle", "Sports", "Racing", "RPG"];
    let mut records: Vec<PurchaseRecord> = (0..10)
        .map(|i| {
            PurchaseRecord::on(format!("c-{i}"), day(1, 1 + i as u32), 10.0, 1)
                .with_genre(genres[i % 5])
                .with_publisher(format!("P{}", i % 5))
        })
        .collect();
    records.push(PurchaseRecord::on("c-x", day(2, 1), 10.0, 1));

    let c = concentration_summary(&records, &ParetoConfig::default()).unwrap();
    assert_eq!(c.genre.top_keys, 1);
    assert!(approx(c.genre.revenue_share_pct, 20.0 / 110.0 * 100.0));
    assert!(!c.genre.concentrated);
    assert_eq!(c.genre.headline, "Diverse genre portfolio");
    assert_eq!(c.publisher.headline, "Balanced distribution across publishers.");
    assert_eq!(c.customer.headline, "Healthy customer distribution");
}

/// With fewer than five publishers the top fifth is empty.
#[test]
fn concentration_of_few_keys_is_zero() {
    let c = concentration_summary(&catalogue(), &ParetoConfig::default()).unwrap();
    assert_eq!(c.genre.top_keys, 0);
    assert_eq!(c.genre.revenue_share_pct, 0.0);
    assert!(!c.genre.concentrated);
    assert_eq!(c.publisher.top_keys, 0);
}

/// Price and MAU levers each add a share of current revenue; MAU growth
/// also scales MAU, and CLV is revenue per MAU.
#[test]
fn scenario_projection() {
    let records = vec![
        PurchaseRecord::on("a", day(1, 2), 100.0, 1),
        PurchaseRecord::on("a", day(2, 2), 50.0, 1),
        PurchaseRecord::on("b", day(2, 5), 100.0, 1),
    ];
    let p = project(&overview(&records), &ScenarioConfig::default());

    assert_eq!(p.current_revenue, 250.0);
    assert_eq!(p.current_mau, 1.5);
    assert!(approx(p.current_clv, 250.0 / 1.5));
    assert!(approx(p.scenario_revenue, 250.0 + 12.5 + 20.0));
    assert!(approx(p.scenario_mau, 1.5 * 1.08));
    assert!(approx(p.scenario_clv, p.scenario_revenue / p.scenario_mau));
}

/// Projections clamp at zero, and no MAU means no CLV.
#[test]
fn scenario_clamps_and_empty() {
    let records = vec![PurchaseRecord::on("a", day(1, 2), 100.0, 1)];
    let cut = ScenarioConfig { price_increase_pct: -300.0, mau_growth_pct: -200.0 };
    let p = project(&overview(&records), &cut);
    assert_eq!(p.scenario_revenue, 0.0);
    assert_eq!(p.scenario_mau, 0.0);
    assert_eq!(p.scenario_clv, 0.0);

    let p = project(&overview(&[]), &ScenarioConfig::default());
    assert_eq!(p.current_mau, 0.0);
    assert_eq!(p.current_clv, 0.0);
    assert_eq!(p.scenario_revenue, 0.0);
}

/// Empty input gives an all-zero overview.
#[test]
fn overview_of_nothing_is_zero() {
    let o = overview(&[]);
    assert_eq!(o.records, 0);
    assert_eq!(o.avg_mau, 0.0);
    assert_eq!(o.arpu, 0.0);
    assert_eq!(o.revenue_growth_pct, 0.0);
    assert!(o.monthly_revenue.is_empty());
}
