//! Stateless HTTP request builder and response parser for the gold price API.
//!
//! # Design
//! `GoldClient` holds the parsed base URL and the default headers and carries
//! no mutable state between calls. Each endpoint has a `build_*` method that
//! produces an `HttpRequest`; every endpoint shares one `parse_response`,
//! because the payload is passed through without a per-endpoint shape.
//! Parameter placement is explicit per endpoint: market type as a path
//! segment, dates as `start_date`/`end_date` query pairs or as a JSON body.

use reqwest::Url;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::DateRange;

/// Synchronous, stateless client for the gold price API.
#[derive(Debug, Clone)]
pub struct GoldClient {
    base_url: Url,
    default_headers: Vec<(String, String)>,
}

impl GoldClient {
    /// Build a client with no default headers.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_headers(base_url, Vec::new())
    }

    pub fn with_headers(
        base_url: &str,
        default_headers: Vec<(String, String)>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{base_url}: not usable as a base URL"
            )));
        }
        Ok(Self {
            base_url,
            default_headers,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `GET /gold/data/{market_type}?start_date=..&end_date=..`
    ///
    /// The market type is not checked against known tags; it is only
    /// percent-encoded as a single path segment.
    pub fn build_get_gold_price_data(
        &self,
        market_type: &str,
        range: &DateRange,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["gold", "data", market_type], &range.query_pairs())?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// `POST /gold/sync` with body `{"start_date":..,"end_date":..}`.
    pub fn build_sync_gold_price_data(&self, range: &DateRange) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(range).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let url = self.endpoint(&["gold", "sync"], &[])?;
        Ok(self.request(HttpMethod::Post, url, Some(body)))
    }

    /// `GET /gold/summary/{market_type}`
    pub fn build_get_market_summary(&self, market_type: &str) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["gold", "summary", market_type], &[])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// `GET /gold/comparison?start_date=..&end_date=..`
    pub fn build_compare_markets(&self, range: &DateRange) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["gold", "comparison"], &range.query_pairs())?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// `GET /gold/latest`
    pub fn build_get_latest_prices(&self) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["gold", "latest"], &[])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// `GET /gold/metadata`
    pub fn build_get_metadata(&self) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["gold", "metadata"], &[])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// Unwrap the response envelope: a 2xx body is returned as parsed JSON
    /// (an empty body as `Value::Null`), anything else becomes
    /// `ApiError::Status` carrying the raw status and body.
    pub fn parse_response(&self, response: &HttpResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body.clone(),
            });
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }

    /// Stamp the default headers; a JSON body always carries a content type,
    /// whatever the defaults say.
    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = self.default_headers.clone();
        let has_content_type = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
        if body.is_some() && !has_content_type {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}
