//! Async facade over the gold price API.
//!
//! # Design
//! `GoldApi` composes the stateless `GoldClient`, a `Transport` and a list of
//! interceptors. Every operation is one `build_*` → dispatch → `parse_response`
//! pass with no retries; the outcome reaches the caller unchanged. All shared
//! state is immutable after construction, so one `GoldApi` (or its clones)
//! can serve any number of concurrent calls.

use std::sync::Arc;

use serde_json::Value;

use crate::client::GoldClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::interceptor::{CallContext, Interceptor, TracingInterceptor};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::DateRange;

pub struct GoldApi<T = ReqwestTransport> {
    client: GoldClient,
    transport: Arc<T>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl<T> Clone for GoldApi<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
            interceptors: self.interceptors.clone(),
        }
    }
}

impl GoldApi<ReqwestTransport> {
    /// Production facade: reqwest transport with the configured timeout,
    /// default headers on every request, and tracing enabled.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let client = GoldClient::with_headers(&config.base_url, config.default_headers.clone())?;
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::new(client, transport))
    }
}

impl<T: Transport> GoldApi<T> {
    /// Facade over an arbitrary transport, with `TracingInterceptor` installed.
    pub fn new(client: GoldClient, transport: T) -> Self {
        Self {
            client,
            transport: Arc::new(transport),
            interceptors: vec![Arc::new(TracingInterceptor)],
        }
    }

    /// Append an interceptor; hooks run in insertion order.
    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn client(&self) -> &GoldClient {
        &self.client
    }

    /// Price history for one market.
    pub async fn get_gold_price_data(
        &self,
        market_type: &str,
        range: &DateRange,
    ) -> Result<Value, ApiError> {
        let request = self.client.build_get_gold_price_data(market_type, range);
        self.dispatch("get_gold_price_data", request).await
    }

    /// Ask the service to pull both markets for the given window.
    pub async fn sync_gold_price_data(&self, range: &DateRange) -> Result<Value, ApiError> {
        let request = self.client.build_sync_gold_price_data(range);
        self.dispatch("sync_gold_price_data", request).await
    }

    pub async fn get_market_summary(&self, market_type: &str) -> Result<Value, ApiError> {
        let request = self.client.build_get_market_summary(market_type);
        self.dispatch("get_market_summary", request).await
    }

    pub async fn compare_markets(&self, range: &DateRange) -> Result<Value, ApiError> {
        let request = self.client.build_compare_markets(range);
        self.dispatch("compare_markets", request).await
    }

    pub async fn get_latest_prices(&self) -> Result<Value, ApiError> {
        let request = self.client.build_get_latest_prices();
        self.dispatch("get_latest_prices", request).await
    }

    pub async fn get_metadata(&self) -> Result<Value, ApiError> {
        let request = self.client.build_get_metadata();
        self.dispatch("get_metadata", request).await
    }

    async fn dispatch(
        &self,
        operation: &'static str,
        request: Result<HttpRequest, ApiError>,
    ) -> Result<Value, ApiError> {
        let ctx = CallContext::new(operation);

        let request = match request {
            Ok(request) => request,
            Err(err) => return Err(self.notify_error(&ctx, err)),
        };

        for interceptor in &self.interceptors {
            interceptor.on_request(&ctx, &request);
        }

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => return Err(self.notify_error(&ctx, err)),
        };

        match self.client.parse_response(&response) {
            Ok(payload) => {
                for interceptor in &self.interceptors {
                    interceptor.on_response(&ctx, &response);
                }
                Ok(payload)
            }
            Err(err) => Err(self.notify_error(&ctx, err)),
        }
    }

    fn notify_error(&self, ctx: &CallContext, err: ApiError) -> ApiError {
        for interceptor in &self.interceptors {
            interceptor.on_error(ctx, &err);
        }
        err
    }
}
