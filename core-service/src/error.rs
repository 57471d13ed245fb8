use core_auth::AuthError;
use core_upload::UploadError;
use provider_google_drive::{FailureClass, GoogleDriveError};
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Local file not found: {path}")]
    LocalFileMissing { path: String },

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// Short name of the failure
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::LocalFileMissing { .. } => "LocalFileMissing",
            ServiceError::Config(_) => "InvalidConfiguration",
            ServiceError::Auth(AuthError::MalformedCredentials(_)) => "MalformedCredentials",
            ServiceError::Auth(_) => "AuthenticationFailed",
            ServiceError::Upload(e) => e.kind(),
        }
    }

    fn drive_error(&self) -> Option<&GoogleDriveError> {
        match self {
            ServiceError::Upload(e) => e.drive_error(),
            _ => None,
        }
    }

    /// Human-readable failure report.
    ///
    /// Verbose output adds the failure kind, its retry classification and the
    /// raw status and body of the last Drive response.
    pub fn diagnostic(&self, verbose: bool) -> String {
        let mut report = format!("Upload failed: {}", self);
        if !verbose {
            return report;
        }

        let _ = write!(report, "\n  kind: {}", self.kind());

        if let Some(drive) = self.drive_error() {
            let class = match drive.class() {
                FailureClass::Retryable => "retryable",
                FailureClass::Fatal => "fatal",
            };
            let _ = write!(report, "\n  class: {}", class);
            if let Some(status) = drive.status() {
                let _ = write!(report, "\n  status: {}", status);
            }
            if let GoogleDriveError::QueryFailed { body, .. }
            | GoogleDriveError::UploadRejected { body, .. } = drive
            {
                let _ = write!(report, "\n  body: {}", body.trim());
            }
        } else if let ServiceError::Auth(AuthError::AuthenticationFailed { status, message }) =
            self
        {
            let _ = write!(report, "\n  class: fatal\n  status: {}\n  body: {}", status, message);
        } else {
            let _ = write!(report, "\n  class: fatal");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exhausted() -> ServiceError {
        ServiceError::Upload(UploadError::MaxAttemptsExceeded {
            attempts: 3,
            last_error: Box::new(GoogleDriveError::UploadRejected {
                status: 503,
                body: "{\"error\": \"backendError\"}\n".to_string(),
            }),
        })
    }

    #[test]
    fn test_plain_diagnostic_is_one_line() {
        let diagnostic = exhausted().diagnostic(false);
        assert!(diagnostic.starts_with("Upload failed: Upload failed after 3 attempts"));
        assert!(!diagnostic.contains('\n'));
    }

    #[test]
    fn test_verbose_diagnostic_includes_raw_response() {
        let diagnostic = exhausted().diagnostic(true);
        assert!(diagnostic.contains("kind: MaxAttemptsExceeded"));
        assert!(diagnostic.contains("class: retryable"));
        assert!(diagnostic.contains("status: 503"));
        assert!(diagnostic.contains("body: {\"error\": \"backendError\"}"));
    }

    #[test]
    fn test_auth_diagnostic() {
        let error = ServiceError::Auth(AuthError::AuthenticationFailed {
            status: 401,
            message: "invalid_client".to_string(),
        });
        assert_eq!(error.kind(), "AuthenticationFailed");

        let diagnostic = error.diagnostic(true);
        assert!(diagnostic.contains("status: 401"));
        assert!(diagnostic.contains("body: invalid_client"));
    }

    #[test]
    fn test_kinds() {
        let missing = ServiceError::LocalFileMissing {
            path: "a.zip".to_string(),
        };
        assert_eq!(missing.kind(), "LocalFileMissing");
        assert!(missing.diagnostic(true).contains("class: fatal"));

        let malformed = ServiceError::Auth(AuthError::MalformedCredentials("bad".to_string()));
        assert_eq!(malformed.kind(), "MalformedCredentials");

        let exists = ServiceError::Upload(UploadError::FileAlreadyExists {
            name: "a.zip".to_string(),
            existing_id: "1".to_string(),
        });
        assert_eq!(exists.kind(), "FileAlreadyExists");
    }
}
