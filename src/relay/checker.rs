//! Comparison of a client's version against a cached record

use bytes::Bytes;

use crate::relay::record::VersionRecord;

/// What the client should be told about its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No usable version upstream; forward the record's status and body
    Failed { status_code: u16, body: Option<Bytes> },
    /// Client already runs the published version
    UpToDate,
    /// Client must update (or sent no version to compare)
    OutOfDate { body: Bytes },
}

/// Compares `client_version` against `record`
///
/// Versions are opaque strings compared for exact equality.
pub fn check_version(record: &VersionRecord, client_version: Option<&str>) -> Verdict {
    let Some(latest) = record.version_number.as_deref() else {
        return Verdict::Failed {
            status_code: record.status_code,
            body: record.body.clone(),
        };
    };

    match client_version {
        Some(current) if current == latest => Verdict::UpToDate,
        _ => Verdict::OutOfDate {
            body: record.body.clone().unwrap_or_default(),
        },
    }
}
