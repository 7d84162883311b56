use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, ValueEnum};

use crate::relay::error::StartupError;
use crate::relay::validator::ALLOW_ALL_PATTERN;

// =============================================================================
// Defaults
// =============================================================================

/// Default listen address; a leading `:` means every interface
pub const DEFAULT_ADDRESS: &str = ":3000";

/// Default time a fetched record is served before re-fetching (30 seconds)
pub const DEFAULT_FRESHNESS_SECS: u64 = 30;

/// Default upper bound for one upstream fetch (10 seconds)
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "version_relay=info";

#[derive(Debug, Parser)]
#[command(name = "version-relay")]
#[command(version, about = "Caching relay for client version checks")]
pub struct Cli {
    #[command(flatten)]
    pub config: RelayConfig,
}

/// Runtime configuration, from flags or `VERSION_RELAY_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct RelayConfig {
    /// Address to listen on
    #[arg(long, env = "VERSION_RELAY_ADDRESS", default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// Regex an upstream URL must match to be relayed
    #[arg(long, env = "VERSION_RELAY_ALLOW", default_value = ALLOW_ALL_PATTERN)]
    pub allow: String,

    /// Seconds a fetched version document is reused
    #[arg(long, env = "VERSION_RELAY_FRESHNESS_SECS", default_value_t = DEFAULT_FRESHNESS_SECS)]
    pub freshness_secs: u64,

    /// Seconds before an upstream fetch is abandoned
    #[arg(long, env = "VERSION_RELAY_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    /// Keep at most this many upstream URLs cached, evicting the least recently used
    #[arg(long, env = "VERSION_RELAY_MAX_ENTRIES")]
    pub max_entries: Option<usize>,

    /// Log output format
    #[arg(long, env = "VERSION_RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "VERSION_RELAY_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl RelayConfig {
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn listen_address(&self) -> Result<SocketAddr, StartupError> {
        parse_listen_address(&self.address)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            allow: ALLOW_ALL_PATTERN.to_string(),
            freshness_secs: DEFAULT_FRESHNESS_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_entries: None,
            log_format: LogFormat::Text,
            log_file: None,
        }
    }
}

/// Parses `host:port`, accepting the `:port` shorthand for all interfaces
pub fn parse_listen_address(address: &str) -> Result<SocketAddr, StartupError> {
    let normalized = match address.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => address.to_string(),
    };

    normalized
        .parse()
        .map_err(|source| StartupError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;

    fn parse(args: &[&str]) -> RelayConfig {
        Cli::try_parse_from(std::iter::once("version-relay").chain(args.iter().copied()))
            .unwrap()
            .config
    }

    #[test]
    #[serial]
    fn cli_without_arguments_uses_defaults() {
        assert_eq!(parse(&[]), RelayConfig::default());
    }

    #[test]
    #[serial]
    fn cli_parses_all_flags() {
        let config = parse(&[
            "--address",
            "127.0.0.1:8080",
            "--allow",
            "^https://updates\\.example\\.com/",
            "--freshness-secs",
            "60",
            "--fetch-timeout-secs",
            "3",
            "--max-entries",
            "100",
            "--log-format",
            "json",
            "--log-file",
            "/var/log/relay.log",
        ]);

        assert_eq!(
            config,
            RelayConfig {
                address: "127.0.0.1:8080".to_string(),
                allow: "^https://updates\\.example\\.com/".to_string(),
                freshness_secs: 60,
                fetch_timeout_secs: 3,
                max_entries: Some(100),
                log_format: LogFormat::Json,
                log_file: Some(PathBuf::from("/var/log/relay.log")),
            }
        );
        assert_eq!(config.freshness(), Duration::from_secs(60));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
    }

    #[test]
    #[serial]
    fn cli_reads_environment_variables() {
        // SAFETY: serialized with every other test touching the environment
        unsafe {
            std::env::set_var("VERSION_RELAY_ALLOW", "example\\.com");
            std::env::set_var("VERSION_RELAY_FRESHNESS_SECS", "5");
        }

        let config = parse(&[]);

        unsafe {
            std::env::remove_var("VERSION_RELAY_ALLOW");
            std::env::remove_var("VERSION_RELAY_FRESHNESS_SECS");
        }

        assert_eq!(config.allow, "example\\.com");
        assert_eq!(config.freshness_secs, 5);
    }

    #[test]
    #[serial]
    fn cli_flag_overrides_environment_variable() {
        // SAFETY: serialized with every other test touching the environment
        unsafe {
            std::env::set_var("VERSION_RELAY_ADDRESS", ":4000");
        }

        let config = parse(&["--address", ":5000"]);

        unsafe {
            std::env::remove_var("VERSION_RELAY_ADDRESS");
        }

        assert_eq!(config.address, ":5000");
    }

    #[rstest]
    #[case(":3000", "0.0.0.0:3000")]
    #[case("127.0.0.1:8080", "127.0.0.1:8080")]
    #[case("[::1]:9000", "[::1]:9000")]
    fn parse_listen_address_accepts_valid_address(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(
            parse_listen_address(input).unwrap(),
            expected.parse::<SocketAddr>().unwrap()
        );
    }

    #[rstest]
    #[case("3000")]
    #[case(":http")]
    #[case("localhost:3000")]
    fn parse_listen_address_rejects_invalid_address(#[case] input: &str) {
        assert!(matches!(
            parse_listen_address(input),
            Err(StartupError::InvalidAddress { .. })
        ));
    }
}
