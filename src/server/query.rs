//! Parsing of the version-check query string

use crate::relay::error::QueryError;

/// A well-formed version-check request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionQuery {
    pub url: String,
    pub version: Option<String>,
}

impl VersionQuery {
    /// Parses `url` (exactly one) and `version` (at most one)
    ///
    /// Unknown parameters are ignored. Values are percent-decoded.
    pub fn parse(raw: Option<&str>) -> Result<Self, QueryError> {
        let mut url = None;
        let mut version = None;

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "url" => {
                    if url.replace(value.into_owned()).is_some() {
                        return Err(QueryError::DuplicateUrl);
                    }
                }
                "version" => {
                    if version.replace(value.into_owned()).is_some() {
                        return Err(QueryError::DuplicateVersion);
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            url: url.ok_or(QueryError::MissingUrl)?,
            version,
        })
    }
}
