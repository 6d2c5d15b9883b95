//! Request parameters and response DTOs for the gold price API.
//!
//! # Design
//! The facade hands back response payloads as `serde_json::Value` without
//! inspecting them. The response structs here mirror the service schema for
//! callers that want typed access; decode with `serde_json::from_value`.
//! They are defined independently from the mock-server crate, and the
//! integration tests catch schema drift between the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Known market tags. Operations take plain `&str` market types, so this
/// enum is a convenience for callers, not a validation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Domestic,
    International,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Domestic => "domestic",
            MarketType::International => "international",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domestic" => Ok(MarketType::Domestic),
            "international" => Ok(MarketType::International),
            other => Err(format!("unknown market type: {other}")),
        }
    }
}

/// Date bounds (`YYYY-MM-DD`) used as query parameters and as the sync body.
///
/// A `None` bound is left out of the query string and the JSON body, letting
/// the service apply its own default. Field order fixes the serialized key
/// order: `start_date` before `end_date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
        }
    }

    /// No bounds; the service picks its default window.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Present bounds as `(name, value)` query pairs, in serialization order.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(start) = self.start_date.as_deref() {
            pairs.push(("start_date", start));
        }
        if let Some(end) = self.end_date.as_deref() {
            pairs.push(("end_date", end));
        }
        pairs
    }
}

/// One daily price row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldPrice {
    pub id: i64,
    pub market_type: String,
    pub date: String,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: f64,
    pub volume: Option<f64>,
    pub created_at: String,
}

/// Payload of `GET /gold/data/{market}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldPriceSeries {
    pub market_type: String,
    pub data: Vec<GoldPrice>,
    pub start_date: String,
    pub end_date: String,
    pub total_count: usize,
}

/// Payload of `GET /gold/summary/{market}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub market_type: String,
    pub latest_price: f64,
    pub previous_price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_type_parses_known_tags() {
        assert_eq!("domestic".parse::<MarketType>(), Ok(MarketType::Domestic));
        assert_eq!(
            "international".parse::<MarketType>(),
            Ok(MarketType::International)
        );
        assert!("lunar".parse::<MarketType>().is_err());
        assert_eq!(MarketType::International.to_string(), "international");
    }

    #[test]
    fn date_range_serializes_in_field_order() {
        let range = DateRange::new("2024-01-01", "2024-01-31");
        assert_eq!(
            serde_json::to_string(&range).unwrap(),
            r#"{"start_date":"2024-01-01","end_date":"2024-01-31"}"#
        );
    }

    #[test]
    fn unbounded_range_omits_both_keys() {
        let range = DateRange::unbounded();
        assert_eq!(serde_json::to_string(&range).unwrap(), "{}");
        assert!(range.query_pairs().is_empty());
    }

    #[test]
    fn half_open_range_keeps_present_bound() {
        let range = DateRange {
            start_date: None,
            end_date: Some("2024-02-01".to_string()),
        };
        assert_eq!(range.query_pairs(), vec![("end_date", "2024-02-01")]);
    }

    #[test]
    fn summary_accepts_missing_previous_price() {
        let summary: MarketSummary = serde_json::from_str(
            r#"{"market_type":"domestic","latest_price":451.2,"previous_price":null,
                "change":null,"change_percent":null,"volume":1200.0}"#,
        )
        .unwrap();
        assert_eq!(summary.latest_price, 451.2);
        assert!(summary.previous_price.is_none());
    }
}
