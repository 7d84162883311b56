//! Caching relay for client version checks
//!
//! Clients ask `GET /?url=<upstream>&version=<current>`; the relay fetches
//! the upstream version document (at most once per freshness window and
//! URL), answers `204 No Content` when the client is current and forwards
//! the document otherwise.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod relay;
pub mod server;
