//! Purchase records — the single input table every analysis reads.
//!
//! `PurchaseRecord` is the validated shape. `RawPurchase` is the loose
//! ingest shape (every field optional) that callers deserialize from JSON
//! and convert with `into_record`, so a missing customer or date surfaces
//! as `InvalidInput` instead of a generic parse failure.

use crate::{
    error::{InsightsError, InsightsResult},
    types::CustomerId,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub customer_id:     CustomerId,
    pub purchase_date:   NaiveDateTime,
    pub net_revenue:     f64,
    pub games_purchased: i64,
    #[serde(default)]
    pub genre:           Option<String>,
    #[serde(default)]
    pub publisher:       Option<String>,
    #[serde(default)]
    pub region:          Option<String>,
}

impl PurchaseRecord {
    pub fn new(
        customer_id: impl Into<CustomerId>,
        purchase_date: NaiveDateTime,
        net_revenue: f64,
        games_purchased: i64,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            purchase_date,
            net_revenue,
            games_purchased,
            genre: None,
            publisher: None,
            region: None,
        }
    }

    /// A record stamped at midnight of `date`.
    pub fn on(
        customer_id: impl Into<CustomerId>,
        date: NaiveDate,
        net_revenue: f64,
        games_purchased: i64,
    ) -> Self {
        Self::new(customer_id, date.and_time(NaiveTime::default()), net_revenue, games_purchased)
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Check the field-level contract. `index` is the record's position in
    /// the caller's slice and is carried into the error.
    pub fn check(&self, index: usize) -> InsightsResult<()> {
        if self.customer_id.trim().is_empty() {
            return Err(invalid(index, "missing customer_id"));
        }
        if !self.net_revenue.is_finite() {
            return Err(invalid(index, format!("net_revenue is not finite ({})", self.net_revenue)));
        }
        if self.net_revenue < 0.0 {
            return Err(invalid(index, format!("negative net_revenue ({})", self.net_revenue)));
        }
        if self.games_purchased < 0 {
            return Err(invalid(
                index,
                format!("negative games_purchased ({})", self.games_purchased),
            ));
        }
        Ok(())
    }
}

/// Validate every record. Fails on the first offending record; there is
/// no partial result.
pub fn validate_all(records: &[PurchaseRecord]) -> InsightsResult<()> {
    for (index, record) in records.iter().enumerate() {
        record.check(index)?;
    }
    Ok(())
}

/// Loose ingest shape. Every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPurchase {
    #[serde(default)]
    pub customer_id:     Option<String>,
    #[serde(default)]
    pub purchase_date:   Option<String>,
    #[serde(default)]
    pub net_revenue:     Option<f64>,
    #[serde(default)]
    pub games_purchased: Option<i64>,
    #[serde(default)]
    pub genre:           Option<String>,
    #[serde(default)]
    pub publisher:       Option<String>,
    #[serde(default)]
    pub region:          Option<String>,
}

impl RawPurchase {
    pub fn into_record(self, index: usize) -> InsightsResult<PurchaseRecord> {
        let customer_id = self
            .customer_id
            .ok_or_else(|| invalid(index, "missing customer_id"))?;
        let date_text = self
            .purchase_date
            .ok_or_else(|| invalid(index, "missing purchase_date"))?;
        let purchase_date = parse_purchase_date(&date_text)
            .ok_or_else(|| invalid(index, format!("unparseable purchase_date '{date_text}'")))?;
        let net_revenue = self
            .net_revenue
            .ok_or_else(|| invalid(index, "missing net_revenue"))?;
        let games_purchased = self
            .games_purchased
            .ok_or_else(|| invalid(index, "missing games_purchased"))?;

        let record = PurchaseRecord {
            customer_id,
            purchase_date,
            net_revenue,
            games_purchased,
            genre: self.genre,
            publisher: self.publisher,
            region: self.region,
        };
        record.check(index)?;
        Ok(record)
    }
}

/// Parse a JSON array of raw purchases into validated records.
pub fn parse_purchases_json(json: &str) -> InsightsResult<Vec<PurchaseRecord>> {
    let raw: Vec<RawPurchase> = serde_json::from_str(json)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, r)| r.into_record(index))
        .collect()
}

/// Accepts a full timestamp or a bare `YYYY-MM-DD` date (midnight).
pub fn parse_purchase_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::default()))
        })
}

fn invalid(index: usize, reason: impl Into<String>) -> InsightsError {
    InsightsError::InvalidInput { index, reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_dates_and_timestamps() {
        let d = parse_purchase_date("2024-03-05").unwrap();
        assert_eq!(d.to_string(), "2024-03-05 00:00:00");
        let t = parse_purchase_date("2024-03-05T14:30:00").unwrap();
        assert_eq!(t.to_string(), "2024-03-05 14:30:00");
        assert!(parse_purchase_date("05/03/2024").is_none());
    }

    #[test]
    fn raw_purchase_without_date_is_invalid_input() {
        let raw = RawPurchase {
            customer_id: Some("c-1".into()),
            net_revenue: Some(10.0),
            games_purchased: Some(1),
            ..Default::default()
        };
        match raw.into_record(4) {
            Err(InsightsError::InvalidInput { index, reason }) => {
                assert_eq!(index, 4);
                assert!(reason.contains("purchase_date"), "reason={reason}");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn negative_games_rejected() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let r = PurchaseRecord::on("c-1", d, 5.0, -1);
        assert!(matches!(r.check(0), Err(InsightsError::InvalidInput { .. })));
    }

    #[test]
    fn blank_customer_id_rejected() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let r = PurchaseRecord::on("  ", d, 5.0, 1);
        assert!(matches!(r.check(0), Err(InsightsError::InvalidInput { .. })));
    }
}
