use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::cache::MemberCache;
use crate::clicks::{ClickCounter, InMemoryClickCounter};
use crate::config::AppConfig;
use crate::ingest::{self, feed::HttpFeed, FeedOrigin, FeedSource, Ingested, RANK_TAG};
use crate::query::{apply_query, select_ids, MemberQuery};
use crate::rank::compute_rank;

const LIST_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=30";
const FEED_ORIGIN_HEADER: &str = "x-feed-origin";
const REVALIDATE_TOKEN_HEADER: &str = "x-token";

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    feed: Option<Arc<dyn FeedSource>>,
    cache: Arc<MemberCache>,
    clicks: Arc<dyn ClickCounter>,
}

impl AppState {
    /// Wire an HTTP feed when `feed_url` is configured, else fallback-only.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let feed: Option<Arc<dyn FeedSource>> = match config.feed_url.as_deref() {
            Some(url) => Some(Arc::new(HttpFeed::new(url, config.feed_timeout())?)),
            None => None,
        };
        Ok(Self::new(config, feed, Arc::new(InMemoryClickCounter::new())))
    }

    pub fn new(
        config: AppConfig,
        feed: Option<Arc<dyn FeedSource>>,
        clicks: Arc<dyn ClickCounter>,
    ) -> Self {
        let cache = Arc::new(MemberCache::new(config.cache_ttl()));
        Self {
            config: Arc::new(config),
            feed,
            cache,
            clicks,
        }
    }

    async fn members(&self) -> Ingested {
        let feed = self.feed.clone();
        self.cache
            .get_or_load(|| async move { ingest::fetch_members(feed.as_deref()).await })
            .await
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/members", get(list_members))
        .route("/api/compare", get(compare_members))
        .route("/api/go", get(go_redirect))
        .route("/api/revalidate", post(revalidate))
        .route("/api/echo", get(echo_get).post(echo_post))
        .route("/debug/clicks", get(debug_clicks))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn origin_header(origin: FeedOrigin) -> HeaderValue {
    HeaderValue::from_static(match origin {
        FeedOrigin::Feed => "feed",
        FeedOrigin::Fallback => "fallback",
    })
}

fn error_json(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "ok": false, "error": msg }))).into_response()
}

async fn list_members(State(state): State<AppState>, Query(q): Query<MemberQuery>) -> Response {
    let ingested = state.members().await;
    let items = apply_query(ingested.members, &q, state.config.default_limit);

    let mut resp = Json(json!({ "ok": true, "items": items })).into_response();
    let headers = resp.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(LIST_CACHE_CONTROL));
    headers.insert(FEED_ORIGIN_HEADER, origin_header(ingested.origin));
    resp
}

/// Hot-ranked members (within the default listing window) whose id is in `ids`.
async fn compare_members(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let ids = q.get("ids").map(String::as_str).unwrap_or_default();
    if ids.trim().is_empty() {
        return Json(json!({ "ok": true, "items": [] }));
    }

    let mut ranked = compute_rank(state.members().await.members);
    ranked.truncate(state.config.default_limit);
    let items = select_ids(ranked, ids);
    Json(json!({ "ok": true, "items": items }))
}

async fn go_redirect(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let url = match q.get("url").map(|u| u.trim()).filter(|u| !u.is_empty()) {
        Some(u) => u.to_string(),
        None => return error_json(StatusCode::BAD_REQUEST, "URL parameter is required"),
    };

    let location = match HeaderValue::from_str(&url) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = ?e, url = %url, "redirect target is not a valid header value");
            return error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process redirect");
        }
    };

    let total = state.clicks.increment(&url);
    metrics::counter!("redirect_clicks_total").increment(1);
    tracing::info!(target: "clicks", url = %url, total, "click");

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

async fn revalidate(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = headers
        .get(REVALIDATE_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());
    let authorized = matches!(
        (state.config.revalidate_token.as_deref(), token),
        (Some(expected), Some(given)) if expected == given
    );
    if !authorized {
        return error_json(StatusCode::UNAUTHORIZED, "Invalid token");
    }

    state.cache.invalidate(RANK_TAG).await;
    Json(json!({
        "ok": true,
        "message": "Cache revalidated successfully",
        "tag": RANK_TAG,
    }))
    .into_response()
}

async fn echo_get() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(json!({ "ok": true, "msg": "Hello API" })),
    )
}

async fn echo_post(body: Bytes) -> Json<serde_json::Value> {
    let received: serde_json::Value = serde_json::from_slice(&body).unwrap_or_else(|_| json!({}));
    Json(json!({ "ok": true, "received": received }))
}

#[derive(serde::Serialize)]
struct ClickOut {
    url: String,
    clicks: u64,
}

async fn debug_clicks(State(state): State<AppState>) -> Json<Vec<ClickOut>> {
    let out = state
        .clicks
        .snapshot()
        .into_iter()
        .map(|(url, clicks)| ClickOut { url, clicks })
        .collect();
    Json(out)
}
