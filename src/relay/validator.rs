//! Allowlist check for upstream URLs

use regex::Regex;

/// Pattern that accepts every URL
pub const ALLOW_ALL_PATTERN: &str = ".*";

/// Gate deciding which upstream URLs may be relayed
///
/// The match is unanchored, so patterns that must cover the whole URL need
/// their own `^`/`$`.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    pattern: Regex,
}

impl UrlValidator {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self {
            pattern: Regex::new(ALLOW_ALL_PATTERN).expect("allow-all pattern is valid"),
        }
    }
}
