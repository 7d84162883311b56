//! HTTP surface of the relay
//!
//! # Modules
//!
//! - [`handler`]: Version-check and metrics handlers plus shared state
//! - [`query`]: Strict parsing of the `url`/`version` query parameters
//! - [`router`]: Route table
//! - [`run`]: Wiring from configuration to a listening server

pub mod handler;
pub mod query;
pub mod router;
pub mod run;
