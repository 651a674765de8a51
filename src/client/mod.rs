//! Typed API client
//!
//! - [`ApiClient`]: reqwest calls for every endpoint, `{ data }` envelopes
//! - [`RequestError`]: status, code, field errors, user-facing text
//! - [`FallbackStrategy`]: mock substitution policy for failed reads
//! - [`RequestGeneration`] / [`LoadState`]: stale-response and loading guards
//! - [`DataService`]: all of the above wired to the [`crate::store::AppStore`]

mod error;
mod fallback;
mod generation;
mod http;
mod service;

pub use error::RequestError;
pub use fallback::{strategy_for, FallbackStrategy, MockFallback, StrictFallback};
pub use generation::{LoadGuard, LoadState, RequestGeneration, Ticket};
pub use http::ApiClient;
pub use service::{DataService, Fetched};
