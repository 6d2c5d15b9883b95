//! In-memory price store with deterministic synthetic data.
//!
//! Rows are keyed by `(market, date)` so a range query is an ordered
//! `BTreeMap` range scan, and a sync never inserts the same day twice.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    Domestic,
    International,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Domestic, Market::International];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Domestic => "domestic",
            Market::International => "international",
        }
    }

    fn base_price(&self) -> f64 {
        match self {
            Market::Domestic => 450.0,
            Market::International => 1800.0,
        }
    }

    /// The international feed only trades on weekdays.
    fn trades_on(&self, date: NaiveDate) -> bool {
        match self {
            Market::Domestic => true,
            Market::International => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domestic" => Ok(Market::Domestic),
            "international" => Ok(Market::International),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub id: i64,
    pub market_type: Market,
    pub date: NaiveDateTime,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: f64,
    pub volume: Option<f64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub status: &'static str,
    pub message: String,
    pub data_count: usize,
    pub synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_count: Option<usize>,
}

#[derive(Debug, Default)]
pub struct PriceStore {
    rows: BTreeMap<(Market, NaiveDate), PriceRow>,
    last_update: BTreeMap<Market, NaiveDateTime>,
    next_id: i64,
}

impl PriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows for `market` with `start <= date <= end`, oldest first.
    pub fn range(&self, market: Market, start: NaiveDate, end: NaiveDate) -> Vec<PriceRow> {
        if start > end {
            return Vec::new();
        }
        self.rows
            .range((market, start)..=(market, end))
            .map(|(_, row)| row.clone())
            .collect()
    }

    /// Fill `[start, end]` for `market` unless at least 80% of the span is
    /// already stored. Existing days are never overwritten.
    pub fn sync(
        &mut self,
        market: Market,
        start: NaiveDate,
        end: NaiveDate,
        now: NaiveDateTime,
    ) -> SyncOutcome {
        let existing = self.range(market, start, end).len();
        let span_days = (end - start).num_days();
        if existing as f64 >= span_days as f64 * 0.8 {
            return SyncOutcome {
                status: "success",
                message: "database already has enough data".to_string(),
                data_count: existing,
                synced: false,
                saved_count: None,
            };
        }

        let mut saved = 0;
        let mut touched = false;
        for date in start.iter_days().take_while(|d| *d <= end) {
            if !market.trades_on(date) {
                continue;
            }
            touched = true;
            if self.rows.contains_key(&(market, date)) {
                continue;
            }
            self.next_id += 1;
            let row = synthesize(self.next_id, market, date, now);
            self.rows.insert((market, date), row);
            saved += 1;
        }
        if touched {
            self.last_update.insert(market, now);
        }

        SyncOutcome {
            status: "success",
            message: format!("synced {saved} new rows"),
            data_count: self.range(market, start, end).len(),
            synced: true,
            saved_count: Some(saved),
        }
    }

    pub fn last_updates(&self) -> impl Iterator<Item = (Market, NaiveDateTime)> + '_ {
        self.last_update.iter().map(|(m, t)| (*m, *t))
    }
}

fn synthesize(id: i64, market: Market, date: NaiveDate, now: NaiveDateTime) -> PriceRow {
    let day = f64::from(date.num_days_from_ce());
    let close = market.base_price() * (1.0 + 0.02 * (day * 0.7).sin() + 0.01 * (day * 0.31).cos());
    let open = close * (1.0 + 0.005 * (day * 1.3).sin());
    let high = open.max(close) * 1.006;
    let low = open.min(close) * 0.994;
    let volume = 1000.0 + (i64::from(date.num_days_from_ce()) * 7919).rem_euclid(9000) as f64;

    PriceRow {
        id,
        market_type: market,
        date: date.and_hms_opt(0, 0, 0).unwrap_or_default(),
        open_price: Some(round2(open)),
        high_price: Some(round2(high)),
        low_price: Some(round2(low)),
        close_price: round2(close),
        volume: Some(volume),
        created_at: now,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn now() -> NaiveDateTime {
        d("2024-02-01").and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn sync_fills_every_domestic_day() {
        let mut store = PriceStore::new();
        let outcome = store.sync(Market::Domestic, d("2024-01-01"), d("2024-01-31"), now());
        assert!(outcome.synced);
        assert_eq!(outcome.saved_count, Some(31));
        assert_eq!(outcome.data_count, 31);
    }

    #[test]
    fn international_skips_weekends() {
        let mut store = PriceStore::new();
        // 2024-01-06 and 2024-01-07 are a Saturday and Sunday.
        store.sync(Market::International, d("2024-01-01"), d("2024-01-07"), now());
        let rows = store.range(Market::International, d("2024-01-01"), d("2024-01-07"));
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.date.weekday().number_from_monday() <= 5));
    }

    #[test]
    fn second_sync_reports_enough_data() {
        let mut store = PriceStore::new();
        store.sync(Market::Domestic, d("2024-01-01"), d("2024-01-31"), now());
        let again = store.sync(Market::Domestic, d("2024-01-01"), d("2024-01-31"), now());
        assert!(!again.synced);
        assert_eq!(again.data_count, 31);
        assert_eq!(again.saved_count, None);
    }

    #[test]
    fn overlapping_sync_only_adds_missing_days() {
        let mut store = PriceStore::new();
        store.sync(Market::Domestic, d("2024-01-01"), d("2024-01-10"), now());
        let outcome = store.sync(Market::Domestic, d("2024-01-01"), d("2024-01-31"), now());
        assert_eq!(outcome.saved_count, Some(21));
        assert_eq!(outcome.data_count, 31);
    }

    #[test]
    fn synthetic_prices_are_deterministic_and_consistent() {
        let mut a = PriceStore::new();
        let mut b = PriceStore::new();
        a.sync(Market::Domestic, d("2024-03-01"), d("2024-03-05"), now());
        b.sync(Market::Domestic, d("2024-03-03"), d("2024-03-04"), now());
        b.sync(Market::Domestic, d("2024-03-01"), d("2024-03-05"), now());

        let day = d("2024-03-03");
        let left = &a.range(Market::Domestic, day, day)[0];
        let right = &b.range(Market::Domestic, day, day)[0];
        assert_eq!(left.close_price, right.close_price);
        assert!(left.low_price.unwrap() <= left.close_price);
        assert!(left.high_price.unwrap() >= left.close_price);
    }

    #[test]
    fn inverted_range_is_empty() {
        let mut store = PriceStore::new();
        store.sync(Market::Domestic, d("2024-01-01"), d("2024-01-31"), now());
        assert!(store
            .range(Market::Domestic, d("2024-01-31"), d("2024-01-01"))
            .is_empty());
    }

    #[test]
    fn metadata_tracks_synced_markets_only() {
        let mut store = PriceStore::new();
        store.sync(Market::International, d("2024-01-01"), d("2024-01-05"), now());
        let updates: Vec<_> = store.last_updates().collect();
        assert_eq!(updates, vec![(Market::International, now())]);
    }
}
