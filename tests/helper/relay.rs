//! Relay setup and request helpers

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use tower::ServiceExt;

use version_relay::config::RelayConfig;
use version_relay::relay::fetcher::VersionFetcher;
use version_relay::relay::record::VersionRecord;
use version_relay::server::handler::AppState;
use version_relay::server::router::build_router;
use version_relay::server::run::build_state;

/// Fetcher publishing a fixed version and counting calls
#[allow(dead_code)]
pub struct CountingFetcher {
    calls: Arc<AtomicUsize>,
    version: String,
    delay: Duration,
}

#[allow(dead_code)]
impl CountingFetcher {
    pub fn new(version: &str, delay: Duration) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            version: version.to_string(),
            delay,
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl VersionFetcher for CountingFetcher {
    async fn fetch(&self, _url: &str) -> VersionRecord {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        VersionRecord::found(
            self.version.clone(),
            Bytes::from(format!(r#"{{"version": "{}"}}"#, self.version)),
        )
    }
}

/// State wired exactly like the binary, with a custom allow pattern
#[allow(dead_code)]
pub fn relay_state(allow: &str) -> AppState {
    build_state(&RelayConfig {
        allow: allow.to_string(),
        fetch_timeout_secs: 5,
        ..RelayConfig::default()
    })
    .unwrap()
}

/// Builds `/?url=...&version=...` with proper percent-encoding
#[allow(dead_code)]
pub fn check_uri(upstream: &str, version: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("url", upstream);
    if let Some(version) = version {
        query.append_pair("version", version);
    }
    format!("/?{}", query.finish())
}

/// Sends a GET through the router and collects the whole response
#[allow(dead_code)]
pub async fn send_get(state: &AppState, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let response = build_router(state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}
