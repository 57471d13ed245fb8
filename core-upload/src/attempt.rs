//! # Attempt State Machine
//!
//! ## State Machine
//!
//! ```text
//! Init → ResolveExisting → CreateOrUpdate → Verify → Succeeded
//!              ↓      ↑           ↓            ↓
//!              │      └─── (retryable, attempts left) ←┘
//!              └──────────────→ Failed ←───────┘
//! ```
//!
//! One attempt walks `ResolveExisting → CreateOrUpdate → Verify` and ends in
//! an [`AttemptResult`]. A retryable result sends the run back to
//! `ResolveExisting`, so existence is looked up again before every write.

use crate::error::UploadError;
use provider_google_drive::{GoogleDriveError, RemoteFile};
use std::fmt;

/// States of an upload run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Init,
    ResolveExisting,
    CreateOrUpdate,
    Verify,
    Succeeded,
    Failed,
}

impl UploadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadState::Succeeded | UploadState::Failed)
    }

    /// Check if transition to `next` is allowed
    pub fn can_transition_to(self, next: UploadState) -> bool {
        use UploadState::*;

        matches!(
            (self, next),
            (Init, ResolveExisting)
                | (ResolveExisting, CreateOrUpdate)
                | (ResolveExisting, ResolveExisting)
                | (ResolveExisting, Failed)
                | (CreateOrUpdate, Verify)
                | (CreateOrUpdate, ResolveExisting)
                | (CreateOrUpdate, Failed)
                | (Verify, Succeeded)
                | (Verify, ResolveExisting)
                | (Verify, Failed)
        )
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadState::Init => "init",
            UploadState::ResolveExisting => "resolve_existing",
            UploadState::CreateOrUpdate => "create_or_update",
            UploadState::Verify => "verify",
            UploadState::Succeeded => "succeeded",
            UploadState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why an attempt may be repeated
#[derive(Debug)]
pub enum AttemptFailure {
    /// A Drive call failed with a retryable error
    Drive(GoogleDriveError),
    /// The write succeeded but the file could not be found afterwards
    NotVisible { file_id: String },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Drive(e) => write!(f, "{}", e),
            AttemptFailure::NotVisible { file_id } => {
                write!(f, "file {} not visible after upload", file_id)
            }
        }
    }
}

/// Outcome of a single attempt
#[derive(Debug)]
pub enum AttemptResult {
    /// Written and verified
    Success(RemoteFile),
    /// Worth repeating if the budget allows
    Retryable(AttemptFailure),
    /// Stop now
    Fatal(UploadError),
}

impl AttemptResult {
    /// Sort a Drive error into retryable or fatal
    pub fn from_drive_error(error: GoogleDriveError) -> Self {
        if error.is_retryable() {
            AttemptResult::Retryable(AttemptFailure::Drive(error))
        } else {
            AttemptResult::Fatal(UploadError::Drive(error))
        }
    }
}
