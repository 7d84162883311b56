//! Upstream fetch and outcome classification

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::relay::error::{FetchError, StartupError};
use crate::relay::record::VersionRecord;

/// User agent sent to upstreams
const USER_AGENT: &str = "version-relay";

/// Upper bound for establishing a connection, independent of the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for fetching an upstream version document
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionFetcher: Send + Sync + 'static {
    /// Performs exactly one fetch of `url` and classifies the outcome
    ///
    /// Never fails: transport problems become a record with status 500 and
    /// no body, upstream errors are passed through with their status.
    async fn fetch(&self, url: &str) -> VersionRecord;
}

/// Fetcher backed by a shared `reqwest` client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, StartupError> {
        if timeout.is_zero() {
            return Err(StartupError::ZeroTimeout);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(StartupError::HttpClient)?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl VersionFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> VersionRecord {
        debug!("Fetching version document from {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("{}: {}", url, FetchError::Transport(e));
                return VersionRecord::local_failure();
            }
        };

        let status = response.status().as_u16();

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("{}: {}", url, FetchError::Body(e));
                return VersionRecord::local_failure();
            }
        };

        if status != 200 {
            warn!("{}: {}", url, FetchError::UpstreamStatus(status));
            return VersionRecord::unusable(status, body);
        }

        match extract_version(&body) {
            Ok(version) => VersionRecord::found(version, body),
            Err(e) => {
                warn!("{}: {}", url, e);
                VersionRecord::unusable(status, body)
            }
        }
    }
}

/// Pulls the `version` field out of a version document
///
/// The document must be a JSON object; arrays and scalars are rejected.
fn extract_version(body: &Bytes) -> Result<String, FetchError> {
    let document: Map<String, Value> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    match document.get("version").and_then(Value::as_str) {
        Some("") => Err(FetchError::Decode("version field is empty".to_string())),
        Some(version) => Ok(version.to_string()),
        None => Err(FetchError::Decode("missing string version field".to_string())),
    }
}
