//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the upload tool:
//! - Upload configuration with fail-fast validation
//! - Logging and tracing setup
//!
//! ## Overview
//!
//! Everything a run needs to know arrives once, through [`config::UploadConfig`],
//! and is never mutated afterwards.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{UploadConfig, UploadConfigBuilder};
pub use error::{Error, Result};
