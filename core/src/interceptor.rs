//! Observation hooks around every API call.
//!
//! # Design
//! Hooks are side-effect only: they receive shared references and return
//! nothing, so they cannot alter, block, or recover a call. `GoldApi` calls
//! `on_request` once before dispatch and exactly one of `on_response` /
//! `on_error` after the call resolves.

use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Identifies one facade call across its hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub operation: &'static str,
    pub request_id: Uuid,
}

impl CallContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            request_id: Uuid::new_v4(),
        }
    }
}

pub trait Interceptor: Send + Sync {
    fn on_request(&self, _ctx: &CallContext, _request: &HttpRequest) {}

    fn on_response(&self, _ctx: &CallContext, _response: &HttpResponse) {}

    /// Called once per failed call, whether the failure came from building
    /// the request, the transport, or the response status.
    fn on_error(&self, _ctx: &CallContext, _error: &ApiError) {}
}

/// Emits `tracing` events for every hook. Installed by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

impl Interceptor for TracingInterceptor {
    fn on_request(&self, ctx: &CallContext, request: &HttpRequest) {
        tracing::debug!(
            operation = ctx.operation,
            request_id = %ctx.request_id,
            method = %request.method,
            url = %request.url,
            body = request.body.as_deref().unwrap_or(""),
            "Sending gold API request"
        );
    }

    fn on_response(&self, ctx: &CallContext, response: &HttpResponse) {
        tracing::debug!(
            operation = ctx.operation,
            request_id = %ctx.request_id,
            status = response.status,
            body = %response.body,
            "Received gold API response"
        );
    }

    fn on_error(&self, ctx: &CallContext, error: &ApiError) {
        tracing::error!(
            operation = ctx.operation,
            request_id = %ctx.request_id,
            error = %error,
            "Gold API request failed"
        );
    }
}
