//! Shared test utilities

mod relay;

#[allow(unused_imports)]
pub use relay::{CountingFetcher, check_uri, relay_state, send_get};
