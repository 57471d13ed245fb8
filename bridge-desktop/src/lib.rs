//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and CI hosts.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::time::Duration;
//!
//! let http_client = ReqwestHttpClient::with_timeout(Duration::from_secs(60))?;
//! ```

mod http;

pub use http::ReqwestHttpClient;
