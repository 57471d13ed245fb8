//! # Upload Configuration
//!
//! The immutable description of one upload run.
//!
//! ## Overview
//!
//! A builder collects the caller's input and [`UploadConfigBuilder::build`]
//! fills in defaults and validates everything up front, so the orchestrator
//! never sees a half-formed request.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::UploadConfig;
//! use std::time::Duration;
//!
//! let config = UploadConfig::builder()
//!     .file_path("/builds/Build-StandaloneWindows64-v0.1.8.zip")
//!     .folder_id("1234567890abcdef")
//!     .max_attempts(15)
//!     .retry_delay(Duration::from_secs(45))
//!     .overwrite(true)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.target_name, "Build-StandaloneWindows64-v0.1.8.zip");
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of upload attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default wait between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Default timeout applied to every HTTP exchange
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a single upload run.
///
/// Use [`UploadConfig::builder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Local file to upload
    pub file_path: PathBuf,

    /// Name the file is stored under in Drive
    pub target_name: String,

    /// Drive folder (possibly on a Shared Drive) that receives the file
    pub folder_id: String,

    /// Replace the content of an existing file with the same name
    pub overwrite: bool,

    /// Total attempts across the whole run, first attempt included
    pub max_attempts: u32,

    /// Fixed wait between attempts
    pub retry_delay: Duration,

    /// Timeout for each individual HTTP exchange
    pub request_timeout: Duration,

    /// Emit per-attempt diagnostics
    pub verbose: bool,
}

impl UploadConfig {
    /// Creates a new builder for constructing an `UploadConfig`.
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - File path and folder id are not empty
    /// - Target name is a plain, non-empty file name
    /// - At least one attempt is allowed
    /// - Request timeout is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.file_path.as_os_str().is_empty() {
            return Err(Error::Config("File path cannot be empty".to_string()));
        }

        if self.folder_id.trim().is_empty() {
            return Err(Error::Config("Folder ID cannot be empty".to_string()));
        }

        if self.target_name.trim().is_empty() {
            return Err(Error::Config("Target name cannot be empty".to_string()));
        }

        if self.target_name.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "Target name '{}' must not contain path separators",
                self.target_name
            )));
        }

        if self.max_attempts == 0 {
            return Err(Error::Config(
                "Max attempts must be at least 1".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`UploadConfig`] instances.
#[derive(Debug, Default)]
pub struct UploadConfigBuilder {
    file_path: Option<PathBuf>,
    target_name: Option<String>,
    folder_id: Option<String>,
    overwrite: bool,
    max_attempts: Option<u32>,
    retry_delay: Option<Duration>,
    request_timeout: Option<Duration>,
    verbose: bool,
}

impl UploadConfigBuilder {
    /// Sets the local file to upload.
    pub fn file_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Sets the name used in Drive. Defaults to the local file's base name.
    pub fn target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    /// Sets the destination folder id.
    pub fn folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    /// Replace an existing file with the same name instead of failing.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the total attempt budget.
    ///
    /// Default: 3
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the fixed delay between attempts.
    ///
    /// Default: 5 seconds
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Sets the per-request HTTP timeout.
    ///
    /// Default: 60 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Enable per-attempt diagnostics.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builds the final `UploadConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file path or folder id is missing,
    /// when no target name can be derived, or when validation fails.
    pub fn build(self) -> Result<UploadConfig> {
        let file_path = self.file_path.ok_or_else(|| {
            Error::Config("File path is required. Use .file_path() to set it.".to_string())
        })?;

        let folder_id = self.folder_id.ok_or_else(|| {
            Error::Config("Folder ID is required. Use .folder_id() to set it.".to_string())
        })?;

        let target_name = match self.target_name {
            Some(name) => name,
            None => default_target_name(&file_path)?,
        };

        let config = UploadConfig {
            file_path,
            target_name,
            folder_id,
            overwrite: self.overwrite,
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            retry_delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            verbose: self.verbose,
        };

        config.validate()?;

        Ok(config)
    }
}

fn default_target_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::Config(format!(
                "Cannot derive a target name from '{}'. Use .target_name() to set it.",
                path.display()
            ))
        })
}
