//! HTTP handlers for the version-check and metrics endpoints

use std::sync::Arc;

use axum::Json;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, info};

use crate::metrics::{CountersSnapshot, MetricsObserver, Outcome, RequestCounters};
use crate::relay::cache::{CacheStats, VersionLookup};
use crate::relay::checker::{Verdict, check_version};
use crate::relay::validator::UrlValidator;
use crate::server::query::VersionQuery;

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<UrlValidator>,
    pub lookup: Arc<dyn VersionLookup>,
    pub metrics: Arc<RequestCounters>,
}

impl AppState {
    pub fn new(
        validator: UrlValidator,
        lookup: Arc<dyn VersionLookup>,
        metrics: Arc<RequestCounters>,
    ) -> Self {
        Self {
            validator: Arc::new(validator),
            lookup,
            metrics,
        }
    }
}

/// Body of `GET /metrics`
#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub requests: CountersSnapshot,
    pub cache: CacheStats,
}

/// `GET /?url=<upstream>[&version=<current>]`
pub async fn handle_version_check(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = match VersionQuery::parse(raw.as_deref()) {
        Ok(query) => query,
        Err(e) => {
            debug!("Rejecting version check: {}", e);
            state.metrics.observe(Outcome::BadRequest);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if !state.validator.is_allowed(&query.url) {
        info!("Refusing to relay {}: not allowed", query.url);
        state.metrics.observe(Outcome::Forbidden);
        return StatusCode::FORBIDDEN.into_response();
    }

    let record = state.lookup.get_or_lookup(&query.url).await;

    match check_version(&record, query.version.as_deref()) {
        Verdict::Failed { status_code, body } => {
            state.metrics.observe(Outcome::Error);
            let status =
                StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            // Failed bodies are forwarded as opaque bytes, never labelled JSON
            match body {
                Some(body) => (status, body).into_response(),
                None => status.into_response(),
            }
        }
        Verdict::UpToDate => {
            state.metrics.observe(Outcome::UpToDate);
            StatusCode::NO_CONTENT.into_response()
        }
        Verdict::OutOfDate { body } => {
            state.metrics.observe(Outcome::OutOfDate);
            ([(CONTENT_TYPE, "application/json")], body).into_response()
        }
    }
}

/// `GET /metrics`
pub async fn handle_metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(MetricsReport {
        requests: state.metrics.snapshot(),
        cache: state.lookup.stats(),
    })
}
