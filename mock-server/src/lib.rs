//! In-process stand-in for the gold price service.
//!
//! Serves the six `/api/v1/gold/*` endpoints from an in-memory store filled
//! with deterministic synthetic prices, and records every request it
//! receives so tests can assert on exactly what a client sent.

pub mod store;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub use store::{Market, PriceRow, PriceStore, SyncOutcome};

/// One request as seen by the server: method, path with query, raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub uri: String,
    pub body: String,
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<PriceStore>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    today: NaiveDate,
}

impl AppState {
    /// State whose default date windows end at `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            store: Arc::new(RwLock::new(PriceStore::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Snapshot of the requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.request_log().clone()
    }

    /// A panic while holding the log cannot leave a half-written entry, so a
    /// poisoned lock is still safe to read and append to.
    fn request_log(&self) -> MutexGuard<'_, Vec<RecordedRequest>> {
        self.requests.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("request log mutex was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    let gold = Router::new()
        .route("/gold/sync", post(sync_gold_price_data))
        .route("/gold/data/{market_type}", get(get_gold_price_data))
        .route("/gold/summary/{market_type}", get(get_market_summary))
        .route("/gold/comparison", get(compare_markets))
        .route("/gold/latest", get(get_latest_prices))
        .route("/gold/metadata", get(get_metadata));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", gold)
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::default()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error replies carry `{"detail": ...}`, the service's error body shape.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    detail: String,
}

impl AppError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

fn parse_market(raw: &str) -> Result<Market, AppError> {
    raw.parse().map_err(|_| {
        AppError::new(
            StatusCode::BAD_REQUEST,
            "market type must be 'domestic' or 'international'",
        )
    })
}

/// Accepts `YYYY-MM-DD` or a full `YYYY-MM-DDTHH:MM:SS` timestamp.
fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|t| t.date()))
        .map_err(|_| {
            AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{field}: invalid date '{raw}', expected YYYY-MM-DD"),
            )
        })
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

// ---------------------------------------------------------------------------
// Request log
// ---------------------------------------------------------------------------

async fn record_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let uri = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    state.request_log().push(RecordedRequest {
        method: parts.method.to_string(),
        uri,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateQuery {
    /// Resolve the window, defaulting to the last `default_days` days.
    fn window(&self, today: NaiveDate, default_days: i64) -> Result<(NaiveDate, NaiveDate), AppError> {
        let start = match self.start_date.as_deref() {
            Some(raw) => parse_date("start_date", raw)?,
            None => today - Duration::days(default_days),
        };
        let end = match self.end_date.as_deref() {
            Some(raw) => parse_date("end_date", raw)?,
            None => today,
        };
        Ok((start, end))
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct GoldPriceSeries {
    pub market_type: Market,
    pub data: Vec<PriceRow>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MarketSummary {
    pub market_type: Market,
    pub latest_price: f64,
    pub previous_price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<f64>,
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "gold price service" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn sync_gold_price_data(
    State(state): State<AppState>,
    Json(input): Json<SyncRequest>,
) -> Result<Json<Value>, AppError> {
    let start = parse_date("start_date", &input.start_date)?;
    let end = parse_date("end_date", &input.end_date)?;

    let mut store = state.store.write().await;
    let stamp = now();
    let domestic = store.sync(Market::Domestic, start, end, stamp);
    let international = store.sync(Market::International, start, end, stamp);
    tracing::info!(
        %start,
        %end,
        domestic = domestic.data_count,
        international = international.data_count,
        "Synced gold price data"
    );

    Ok(Json(json!({
        "status": "success",
        "message": "data sync complete",
        "domestic": domestic,
        "international": international,
    })))
}

async fn get_gold_price_data(
    State(state): State<AppState>,
    Path(market_type): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<GoldPriceSeries>, AppError> {
    let market = parse_market(&market_type)?;
    let (start, end) = query.window(state.today, 30)?;

    let mut data = state.store.read().await.range(market, start, end);
    if data.is_empty() {
        let mut store = state.store.write().await;
        store.sync(market, start, end, now());
        data = store.range(market, start, end);
    }
    if data.is_empty() {
        return Err(AppError::new(
            StatusCode::NOT_FOUND,
            "no data found, sync first",
        ));
    }

    Ok(Json(GoldPriceSeries {
        market_type: market,
        total_count: data.len(),
        data,
        start_date: midnight(start),
        end_date: midnight(end),
    }))
}

async fn get_market_summary(
    State(state): State<AppState>,
    Path(market_type): Path<String>,
) -> Result<Json<MarketSummary>, AppError> {
    let market = parse_market(&market_type)?;
    let data = state
        .store
        .read()
        .await
        .range(market, state.today - Duration::days(3), state.today);

    let latest = data
        .last()
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "not enough data"))?;
    let previous = data.len().checked_sub(2).and_then(|i| data.get(i));

    let change = previous.map(|p| latest.close_price - p.close_price);
    let change_percent = previous
        .zip(change)
        .map(|(p, c)| c / p.close_price * 100.0);

    Ok(Json(MarketSummary {
        market_type: market,
        latest_price: latest.close_price,
        previous_price: previous.map(|p| p.close_price),
        change,
        change_percent,
        volume: latest.volume,
    }))
}

async fn compare_markets(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let (start, end) = query.window(state.today, 7)?;
    let store = state.store.read().await;

    let mut body = json!({
        "status": "success",
        "start_date": midnight(start),
        "end_date": midnight(end),
    });
    for market in Market::ALL {
        let data = store.range(market, start, end);
        body[market.as_str()] = json!({
            "market_type": market,
            "data_count": data.len(),
            "data": data,
        });
    }
    Ok(Json(body))
}

async fn get_latest_prices(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read().await;
    let from = state.today - Duration::days(10);

    let mut data = serde_json::Map::new();
    for market in Market::ALL {
        if let Some(latest) = store.range(market, from, state.today).last() {
            data.insert(
                market.as_str().to_string(),
                json!({
                    "market_type": market,
                    "price": latest.close_price,
                    "date": latest.date,
                }),
            );
        }
    }

    Json(json!({
        "status": "success",
        "data": data,
        "timestamp": now(),
    }))
}

async fn get_metadata(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read().await;
    let metadata: Vec<Value> = store
        .last_updates()
        .map(|(market, last_update)| {
            json!({
                "market_type": market,
                "last_update": last_update,
            })
        })
        .collect();

    Json(json!({
        "status": "success",
        "metadata": metadata,
    }))
}
