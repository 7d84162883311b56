//! Version relay core: fetching, caching and comparing upstream versions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Validator  │────▶│    Cache    │────▶│   Checker   │
//! │ (allowlist) │     │(single-flt) │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                        │       │
//!                        ▼       ▼
//!                 ┌─────────┐ ┌─────────┐
//!                 │ Fetcher │ │  Store  │
//!                 │ (HTTP)  │ │(records)│
//!                 └─────────┘ └─────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Time-limited cache with one in-flight fetch per URL
//! - [`checker`]: Maps a record and the client's version to a verdict
//! - [`error`]: Error types for queries, fetches and startup
//! - [`fetcher`]: Fetches an upstream document and classifies the outcome
//! - [`record`]: The cached outcome of one fetch
//! - [`store`]: Storage backends behind the cache (unbounded and LRU)
//! - [`validator`]: Allowlist check for upstream URLs

pub mod cache;
pub mod checker;
pub mod error;
pub mod fetcher;
pub mod record;
pub mod store;
pub mod validator;
