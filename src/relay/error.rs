use thiserror::Error;

/// Why a fetch did not produce a usable version.
///
/// Never surfaced to clients directly: the fetcher folds each variant into a
/// [`VersionRecord`](crate::relay::record::VersionRecord).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("Invalid version document: {0}")]
    Decode(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Missing url parameter")]
    MissingUrl,

    #[error("Multiple url parameters")]
    DuplicateUrl,

    #[error("Multiple version parameters")]
    DuplicateVersion,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid allow pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid listen address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Fetch timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
