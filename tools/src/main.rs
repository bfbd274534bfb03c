//! insights-runner: headless runner for the player insights core.
//!
//! Usage:
//!   insights-runner --input purchases.json
//!   insights-runner --seed 12345 --customers 500 --json
//!   insights-runner --data-dir ./data --genre RPG

use anyhow::{Context, Result};
use insights_core::{
    config::InsightsConfig,
    engine::InsightsEngine,
    purchase::{parse_purchases_json, PurchaseRecord},
    report::InsightsReport,
    synthetic::SyntheticPurchases,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let json_mode = args.iter().any(|a| a == "--json");
    let input = flag_value(&args, "--input");
    let data_dir = flag_value(&args, "--data-dir");
    let genre = flag_value(&args, "--genre");

    let mut config = match data_dir {
        Some(dir) => InsightsConfig::load(dir)?,
        None => InsightsConfig::default(),
    };
    config.synthetic.customers = parse_arg(&args, "--customers", config.synthetic.customers);

    let records = match input {
        Some(path) => load_records(path)?,
        None => {
            log::info!(
                "no --input given; generating {} synthetic customers (seed={seed})",
                config.synthetic.customers
            );
            SyntheticPurchases::generate(seed, &config.synthetic)
        }
    };

    let engine = InsightsEngine::new(config);
    let report = engine.run(&records)?;

    if json_mode {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    print_summary(&report, engine.config().pareto.target_share_pct);

    if let Some(genre) = genre {
        print_genre_cohorts(&engine, &records, genre)?;
    }

    Ok(())
}

fn load_records(path: &str) -> Result<Vec<PurchaseRecord>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    let records = parse_purchases_json(&content)?;
    log::info!("loaded {} purchase records from {path}", records.len());
    Ok(records)
}

fn print_summary(report: &InsightsReport, target_share_pct: f64) {
    let o = &report.overview;
    println!("=== DATASET OVERVIEW ===");
    println!("  records:          {}", o.records);
    println!("  unique customers: {}", o.unique_customers);
    println!("  date range:       {} days", o.date_range_days);
    println!("  total revenue:    ${:.2}", o.total_revenue);
    println!("  avg transaction:  ${:.2}", o.avg_transaction_value);
    println!("  avg MAU:          {:.1}", o.avg_mau);
    println!("  arpu (per MAU):   ${:.2}", o.arpu);
    println!("  per customer:     ${:.2}", o.revenue_per_customer);
    println!("  revenue growth:   {:+.1}% month over month", o.revenue_growth_pct);

    println!();
    println!("=== MONTHLY REVENUE ===");
    for m in &o.monthly_revenue {
        println!("  {} | ${:>10.2} | {:>5} active", m.month, m.revenue, m.active_customers);
    }

    println!();
    println!("=== RFM SEGMENTS ===");
    if report.segments.is_empty() {
        println!("  (No customers)");
    }
    for s in &report.segments {
        println!(
            "  {:<16} | {:>5} customers ({:>5.1}%) | value ${:>10.2} | avg ${:>8.2} | {}",
            s.segment.label(),
            s.customers,
            s.customer_share_pct,
            s.total_monetary,
            s.avg_monetary,
            s.playbook,
        );
    }

    println!();
    println!("=== COHORT RETENTION ===");
    for row in &report.cohorts.rows {
        let cells: Vec<String> = row
            .retention_pct
            .iter()
            .map(|p| format!("{p:>5.1}"))
            .collect();
        println!("  {} (n={:>4}) | {}", row.cohort, row.cohort_size, cells.join(" "));
    }
    let r = &report.retention;
    println!(
        "  latest cohort M1: {} {}",
        fmt_pct(r.latest_m1_pct),
        r.latest_m1_label.as_deref().unwrap_or(""),
    );
    println!("  latest cohort M3: {}", fmt_pct(r.latest_m3_pct));
    println!(
        "  average M1:       {} {}",
        fmt_pct(r.avg_m1_pct),
        r.avg_m1_label.as_deref().unwrap_or(""),
    );

    println!();
    println!("=== PARETO BY {} ===", report.pareto.dimension.name().to_uppercase());
    for e in report.pareto.entries.iter().take(10) {
        println!("  {:<24} ${:>10.2} | cumulative {:>5.1}%", e.key, e.revenue, e.cumulative_pct);
    }
    println!(
        "  {} of {} keys reach {target_share_pct:.0}% of revenue",
        report.pareto_keys_for_target,
        report.pareto.entries.len(),
    );
    for c in [&report.concentration.publisher, &report.concentration.genre, &report.concentration.customer] {
        println!(
            "  top {:>3} {:<10} hold {:>5.1}% of revenue | {}",
            c.top_keys,
            c.dimension.name(),
            c.revenue_share_pct,
            c.headline,
        );
    }

    let s = &report.scenario;
    println!();
    println!("=== WHAT-IF SCENARIO ===");
    println!(
        "  revenue: ${:.0} -> ${:.0} (+${:.0})",
        s.current_revenue,
        s.scenario_revenue,
        s.scenario_revenue - s.current_revenue,
    );
    println!("  MAU:     {:.1} -> {:.1}", s.current_mau, s.scenario_mau);
    println!("  CLV:     ${:.2} -> ${:.2}", s.current_clv, s.scenario_clv);
}

fn print_genre_cohorts(
    engine: &InsightsEngine,
    records: &[PurchaseRecord],
    genre: &str,
) -> Result<()> {
    let matrix = engine.genre_cohorts(records, genre)?;
    println!();
    println!("=== COHORT RETENTION: {genre} ===");
    if matrix.is_empty() {
        println!("  (No purchases in {genre})");
        return Ok(());
    }
    for cohort in matrix.cohorts() {
        let curve: Vec<String> = matrix
            .age_curve(cohort)
            .iter()
            .map(|p| format!("{p:>5.1}"))
            .collect();
        println!("  {cohort} (n={:>4}) | {}", matrix.cohort_size(cohort), curve.join(" "));
    }
    Ok(())
}

fn fmt_pct(p: Option<f64>) -> String {
    p.map(|v| format!("{v:.1}%")).unwrap_or_else(|| "n/a".to_string())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
