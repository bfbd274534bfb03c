//! Shared primitive types used across the analytics core.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque customer identifier. Many purchase records share one.
pub type CustomerId = String;

/// A calendar month. Used for cohort and period bucketing.
///
/// Orders chronologically, displays and serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MonthKey {
    pub year:  i32,
    pub month: u32, // 1..=12
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }

    pub fn of(ts: &NaiveDateTime) -> Self {
        Self { year: ts.year(), month: ts.month() }
    }

    /// Months elapsed from `self` to `later`. Negative if `later` is earlier.
    pub fn months_until(&self, later: &MonthKey) -> i64 {
        (later.year as i64 - self.year as i64) * 12 + (later.month as i64 - self.month as i64)
    }

    /// The month `n` months after this one.
    pub fn plus_months(&self, n: u32) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + n as i64;
        Self {
            year:  zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let (year, month) = text
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{text}'"))?;
        let year: i32 = year.parse().map_err(|_| format!("bad year in '{text}'"))?;
        let month: u32 = month.parse().map_err(|_| format!("bad month in '{text}'"))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in '{text}'"));
        }
        Ok(Self { year, month })
    }
}
