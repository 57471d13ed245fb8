//! # Google Drive Provider
//!
//! Typed access to the Drive API v3 for uploading a single file.
//!
//! ## Overview
//!
//! This module provides:
//! - The [`DriveClient`] capability trait used by the upload orchestrator
//! - [`GoogleDriveConnector`], its HTTP implementation with Shared Drive support
//! - Multipart uploads for small files and resumable chunked uploads for large ones
//! - Retryable/fatal classification of every failure ([`FailureClass`])

pub mod client;
pub mod connector;
pub mod error;
pub mod multipart;
pub mod types;

pub use client::{DriveClient, RemoteFile};
pub use connector::GoogleDriveConnector;
pub use error::{FailureClass, GoogleDriveError, Result};
pub use types::DriveFile;
