//! Client for the gold price service.
//!
//! # Overview
//! Six REST endpoints (price history, sync, market summary, comparison,
//! latest prices, metadata) exposed as async functions on `GoldApi`. Response
//! payloads come back as `serde_json::Value`, exactly as the server sent them.
//!
//! # Design
//! - `GoldClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern), so request
//!   marshaling is testable without a server.
//! - `Transport` executes the round-trip; `ReqwestTransport` is the default.
//! - `Interceptor` hooks observe each call before dispatch and after it
//!   resolves; `TracingInterceptor` logs through `tracing`.
//! - No retries, caching, or validation: errors reach the caller as-is.
//!
//! ```rust,no_run
//! use gold_client::{ClientConfig, DateRange, GoldApi};
//!
//! # async fn run() -> Result<(), gold_client::ApiError> {
//! let api = GoldApi::from_config(&ClientConfig::default())?;
//! let history = api
//!     .get_gold_price_data("domestic", &DateRange::new("2024-01-01", "2024-01-31"))
//!     .await?;
//! println!("{history}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod transport;
pub mod types;

pub use api::GoldApi;
pub use client::GoldClient;
pub use config::{load_config, load_config_from_path, ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{CallContext, Interceptor, TracingInterceptor};
pub use transport::{ReqwestTransport, Transport};
pub use types::{DateRange, GoldPrice, GoldPriceSeries, MarketSummary, MarketType};
