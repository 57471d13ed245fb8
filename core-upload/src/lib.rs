//! # Upload Orchestration
//!
//! Drives a [`DriveClient`](provider_google_drive::DriveClient) through
//! resolve, write and verify steps until the file is confirmed in Drive or
//! the attempt budget runs out.
//!
//! ## Components
//!
//! - [`UploadOrchestrator`]: the retry loop
//! - [`UploadState`]: states of a single run
//! - [`AttemptResult`]: what one pass through the states produced
//! - [`UploadError`]: terminal failures

pub mod attempt;
pub mod error;
pub mod orchestrator;

pub use attempt::{AttemptFailure, AttemptResult, UploadState};
pub use error::{Result, UploadError};
pub use orchestrator::{UploadOrchestrator, UploadOutcome};
