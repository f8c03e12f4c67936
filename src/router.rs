use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{Signal, SignalStatus};
use crate::remote::{BotProfile, WebhookUpdate};
use crate::services::{IngestService, ProbeOutcome, ProbeService};
use crate::store::{ListOrder, SignalFilter, SignalStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SignalStore>,
    pub ingest: IngestService,
    pub probe: ProbeService,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/telegram-webhook", post(telegram_webhook))
        .route("/signals", get(list_signals))
        .route("/test-bot-connection", post(test_bot_connection))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "Server is running!"
}

/// Inbound delivery from the chat platform. Acknowledged with 200 whatever
/// the payload looks like, so the platform stops redelivering; only a store
/// fault surfaces as an error and makes it retry later.
async fn telegram_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let update = match serde_json::from_value::<WebhookUpdate>(payload) {
        Ok(update) => update,
        Err(err) => {
            debug!("Ignoring malformed webhook payload: {}", err);
            return Ok(StatusCode::OK);
        }
    };

    state.ingest.ingest(&update).await?;
    Ok(StatusCode::OK)
}

/// Poll parameters. The dashboard also sends a cache-busting `ts` nonce;
/// the response must not vary on it, so it stays unmodeled and ignored.
#[derive(Debug, Default, Deserialize)]
struct SignalsQuery {
    status: Option<SignalStatus>,
    pair: Option<String>,
    order: Option<ListOrder>,
}

/// Snapshot poll. Every response, errors included, carries the no-cache trio.
async fn list_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalsQuery>,
) -> Result<(HeaderMap, Json<Vec<Signal>>), (HeaderMap, ApiError)> {
    let filter = SignalFilter {
        status: query.status,
        pair: query.pair,
    };
    let order = query.order.unwrap_or_default();

    let signals = state
        .store
        .list(&filter, order)
        .await
        .map_err(|err| (no_cache_headers(), ApiError::from(err)))?;
    Ok((no_cache_headers(), Json(signals)))
}

/// Every cache between the store and the dashboard is told to drop the
/// response; each poll has to observe the latest snapshot.
fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers
}

#[derive(Debug, Deserialize)]
struct ProbeRequest {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProbeResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<BotProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn test_bot_connection(
    State(state): State<AppState>,
    Json(request): Json<ProbeRequest>,
) -> (StatusCode, Json<ProbeResponse>) {
    let token = request.token.unwrap_or_default();

    match state.probe.probe(&token).await {
        ProbeOutcome::Connected(profile) => (
            StatusCode::OK,
            Json(ProbeResponse {
                ok: true,
                result: Some(profile),
                error: None,
            }),
        ),
        ProbeOutcome::Rejected { reason } => (
            StatusCode::BAD_REQUEST,
            Json(ProbeResponse {
                ok: false,
                result: None,
                error: Some(reason),
            }),
        ),
        ProbeOutcome::Unreachable { reason } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProbeResponse {
                ok: false,
                result: None,
                error: Some(reason),
            }),
        ),
    }
}
