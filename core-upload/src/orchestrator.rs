//! # Upload Orchestrator
//!
//! Bounded retry loop around one resolve/write/verify attempt.
//!
//! ## Rules
//!
//! - The attempt budget is global: every pass through `ResolveExisting`
//!   counts, the first one included
//! - A retryable failure waits the fixed retry delay, then starts over at
//!   `ResolveExisting`
//! - A fatal failure ends the run immediately
//! - An existing file is only written to when overwriting was requested
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_upload::UploadOrchestrator;
//!
//! let orchestrator = UploadOrchestrator::new(drive, config);
//! let outcome = orchestrator.run().await?;
//! println!("{} ({})", outcome.file.name, outcome.file.id);
//! ```

use crate::attempt::{AttemptFailure, AttemptResult, UploadState};
use crate::error::{Result, UploadError};
use core_runtime::config::UploadConfig;
use provider_google_drive::{DriveClient, RemoteFile};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A verified upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// The file as Drive reported it during verification
    pub file: RemoteFile,
    /// Attempts used, first included
    pub attempts: u32,
}

/// Retry/verify state machine for a single file
pub struct UploadOrchestrator {
    drive: Arc<dyn DriveClient>,
    config: UploadConfig,
}

impl UploadOrchestrator {
    pub fn new(drive: Arc<dyn DriveClient>, config: UploadConfig) -> Self {
        Self { drive, config }
    }

    /// Run attempts until the file is verified, a fatal error occurs, or the
    /// budget is spent.
    ///
    /// # Errors
    ///
    /// - [`UploadError::FileAlreadyExists`] when the name is taken and
    ///   overwrite is off; nothing is written
    /// - [`UploadError::Drive`] for the first fatal Drive failure
    /// - [`UploadError::MaxAttemptsExceeded`] with the last error when every
    ///   attempt failed retryably
    /// - [`UploadError::VerificationFailed`] when the final attempt wrote the
    ///   file but could not see it afterwards
    #[instrument(skip(self), fields(name = %self.config.target_name, folder_id = %self.config.folder_id))]
    pub async fn run(&self) -> Result<UploadOutcome> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut state = UploadState::Init;
        let mut attempt: u32 = 1;

        loop {
            info!(attempt = attempt, max_attempts = max_attempts, "Starting upload attempt");

            match self.attempt(&mut state).await {
                AttemptResult::Success(file) => {
                    advance(&mut state, UploadState::Succeeded);
                    info!(file_id = %file.id, attempts = attempt, "Upload verified");
                    return Ok(UploadOutcome {
                        file,
                        attempts: attempt,
                    });
                }
                AttemptResult::Fatal(error) => {
                    advance(&mut state, UploadState::Failed);
                    info!(attempt = attempt, kind = error.kind(), "Upload stopped on a fatal error");
                    return Err(error);
                }
                AttemptResult::Retryable(failure) => {
                    if attempt >= max_attempts {
                        advance(&mut state, UploadState::Failed);
                        info!(attempts = attempt, "Retry budget exhausted");
                        return Err(exhausted(failure, attempt));
                    }

                    info!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_secs = self.config.retry_delay.as_secs_f64(),
                        error = %failure,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One pass through resolve, write and verify
    async fn attempt(&self, state: &mut UploadState) -> AttemptResult {
        let config = &self.config;

        advance(state, UploadState::ResolveExisting);
        let existing = match self
            .drive
            .find_by_name(&config.folder_id, &config.target_name)
            .await
        {
            Ok(existing) => existing,
            Err(e) => return AttemptResult::from_drive_error(e),
        };

        let written = match existing {
            Some(file) if !config.overwrite => {
                return AttemptResult::Fatal(UploadError::FileAlreadyExists {
                    name: config.target_name.clone(),
                    existing_id: file.id,
                });
            }
            Some(file) => {
                advance(state, UploadState::CreateOrUpdate);
                debug!(file_id = %file.id, "Replacing content of existing file");
                self.drive.update_file(&file.id, &config.file_path).await
            }
            None => {
                advance(state, UploadState::CreateOrUpdate);
                debug!("Creating new file");
                self.drive
                    .create_file(&config.folder_id, &config.target_name, &config.file_path)
                    .await
            }
        };

        let written = match written {
            Ok(file) => file,
            Err(e) => return AttemptResult::from_drive_error(e),
        };

        advance(state, UploadState::Verify);
        match self.drive.get_by_id(&written.id).await {
            Ok(Some(file)) => AttemptResult::Success(file),
            Ok(None) => AttemptResult::Retryable(AttemptFailure::NotVisible {
                file_id: written.id,
            }),
            Err(e) => AttemptResult::from_drive_error(e),
        }
    }
}

fn advance(state: &mut UploadState, next: UploadState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid transition {} -> {}",
        state,
        next
    );
    debug!(from = %state, to = %next, "State transition");
    *state = next;
}

fn exhausted(failure: AttemptFailure, attempts: u32) -> UploadError {
    match failure {
        AttemptFailure::Drive(e) => UploadError::MaxAttemptsExceeded {
            attempts,
            last_error: Box::new(e),
        },
        AttemptFailure::NotVisible { file_id } => {
            UploadError::VerificationFailed { file_id, attempts }
        }
    }
}
