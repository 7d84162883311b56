//! The cached outcome of one upstream fetch

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

/// Status used for failures that happened on our side of the connection
pub const LOCAL_FAILURE_STATUS: u16 = 500;

/// Last known state of one upstream URL
///
/// `version_number` is `Some` only for a 200 response whose body carried a
/// usable version; every other outcome leaves it `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub fetched_at: Instant,
    pub status_code: u16,
    pub version_number: Option<String>,
    pub body: Option<Bytes>,
}

impl VersionRecord {
    /// A successfully decoded version document
    pub fn found(version: impl Into<String>, body: Bytes) -> Self {
        Self {
            fetched_at: Instant::now(),
            status_code: 200,
            version_number: Some(version.into()),
            body: Some(body),
        }
    }

    /// An upstream answer without a usable version (non-200 or undecodable)
    pub fn unusable(status_code: u16, body: Bytes) -> Self {
        Self {
            fetched_at: Instant::now(),
            status_code,
            version_number: None,
            body: Some(body),
        }
    }

    /// Transport or body-read failure; nothing to forward
    pub fn local_failure() -> Self {
        Self {
            fetched_at: Instant::now(),
            status_code: LOCAL_FAILURE_STATUS,
            version_number: None,
            body: None,
        }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    /// Whether the record may still be served without re-fetching
    pub fn is_fresh(&self, now: Instant, freshness: Duration) -> bool {
        self.age(now) < freshness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn is_fresh_until_threshold_is_reached() {
        let record = VersionRecord::found("1.0.0", Bytes::from_static(b"{}"));
        let freshness = Duration::from_secs(30);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(record.is_fresh(Instant::now(), freshness));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!record.is_fresh(Instant::now(), freshness));
    }

    #[test]
    fn local_failure_has_no_body_and_no_version() {
        let record = VersionRecord::local_failure();

        assert_eq!(record.status_code, LOCAL_FAILURE_STATUS);
        assert_eq!(record.version_number, None);
        assert_eq!(record.body, None);
    }
}
