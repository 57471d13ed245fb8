//! # Host Bridge Traits
//!
//! Capability traits the upload core depends on but does not implement.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - a single async HTTP exchange
//! - [`Clock`](time::Clock) - time source for token lifetimes
//!
//! ## Error Handling
//!
//! Every bridge uses [`BridgeError`](error::BridgeError). Implementations
//! should map transport failures onto `Timeout` and `Connection` so callers
//! can tell transient failures apart from permanent ones.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared through
//! `Arc<dyn _>`.

pub mod error;
pub mod http;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
