//! Error types for Google Drive provider

use crate::types::ApiErrorResponse;
use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

/// Error reasons Drive uses for quota throttling, reported with status 403
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

/// Whether a failed call is worth another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient: the same call may succeed later
    Retryable,
    /// Permanent: repeating the call cannot help
    Fatal,
}

/// Google Drive provider errors
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// A metadata lookup returned a non-2xx status
    #[error("Drive query failed (status {status}): {body}")]
    QueryFailed { status: u16, body: String },

    /// A create or update call returned a non-2xx status
    #[error("Drive rejected the upload (status {status}): {body}")]
    UploadRejected { status: u16, body: String },

    /// The file being updated no longer exists
    #[error("File {file_id} no longer exists")]
    FileVanished { file_id: String },

    /// A resumable session stopped accepting bytes
    #[error("Resumable upload made no progress at byte {offset}")]
    UploadStalled { offset: u64 },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The local file could not be read
    #[error("Cannot read local file {path}: {message}")]
    LocalFile { path: String, message: String },

    /// No usable access token
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport-level failure (timeout, connection reset, DNS)
    #[error(transparent)]
    Transport(#[from] BridgeError),
}

/// Result type for Google Drive operations
pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl GoogleDriveError {
    /// Classify the failure for the retry loop.
    ///
    /// Retryable: transport failures, 429, 5xx, 403 rate-limit reasons, a file
    /// that vanished mid-update, a stalled resumable session.
    /// Fatal: every other status, credential problems, unreadable local files
    /// and unparseable responses.
    pub fn class(&self) -> FailureClass {
        match self {
            GoogleDriveError::QueryFailed { status, body }
            | GoogleDriveError::UploadRejected { status, body } => classify_status(*status, body),
            GoogleDriveError::FileVanished { .. } | GoogleDriveError::UploadStalled { .. } => {
                FailureClass::Retryable
            }
            GoogleDriveError::Transport(e) if e.is_transient() => FailureClass::Retryable,
            GoogleDriveError::Auth(e) if e.is_transient() => FailureClass::Retryable,
            _ => FailureClass::Fatal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == FailureClass::Retryable
    }

    /// HTTP status behind the failure, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            GoogleDriveError::QueryFailed { status, .. }
            | GoogleDriveError::UploadRejected { status, .. } => Some(*status),
            GoogleDriveError::FileVanished { .. } => Some(404),
            GoogleDriveError::Auth(AuthError::AuthenticationFailed { status, .. }) => {
                Some(*status)
            }
            _ => None,
        }
    }
}

fn classify_status(status: u16, body: &str) -> FailureClass {
    match status {
        429 | 500..=599 => FailureClass::Retryable,
        403 if is_rate_limited(body) => FailureClass::Retryable,
        _ => FailureClass::Fatal,
    }
}

fn is_rate_limited(body: &str) -> bool {
    serde_json::from_str::<ApiErrorResponse>(body)
        .map(|response| {
            response
                .error
                .errors
                .iter()
                .any(|detail| RATE_LIMIT_REASONS.contains(&detail.reason.as_str()))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16, body: &str) -> GoogleDriveError {
        GoogleDriveError::UploadRejected {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_error_display() {
        let error = GoogleDriveError::QueryFailed {
            status: 404,
            body: "File not found".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Drive query failed (status 404): File not found"
        );
    }

    #[test]
    fn test_server_errors_are_retryable() {
        for status in [429, 500, 502, 503, 504] {
            assert_eq!(rejected(status, "").class(), FailureClass::Retryable, "{}", status);
        }
    }

    #[test]
    fn test_client_errors_are_fatal() {
        for status in [400, 401, 403, 404, 409] {
            assert_eq!(rejected(status, "").class(), FailureClass::Fatal, "{}", status);
        }
    }

    #[test]
    fn test_rate_limited_403_is_retryable() {
        let body = r#"{
            "error": {
                "code": 403,
                "message": "User Rate Limit Exceeded",
                "errors": [{"domain": "usageLimits", "reason": "userRateLimitExceeded", "message": "User Rate Limit Exceeded"}]
            }
        }"#;
        assert_eq!(rejected(403, body).class(), FailureClass::Retryable);
    }

    #[test]
    fn test_permission_403_is_fatal() {
        let body = r#"{
            "error": {
                "code": 403,
                "message": "Insufficient permissions for the specified parent.",
                "errors": [{"domain": "global", "reason": "insufficientFilePermissions", "message": "Insufficient permissions"}]
            }
        }"#;
        assert_eq!(rejected(403, body).class(), FailureClass::Fatal);
    }

    #[test]
    fn test_transport_classification() {
        let timeout = GoogleDriveError::Transport(BridgeError::Timeout("60s".into()));
        assert!(timeout.is_retryable());

        let unavailable = GoogleDriveError::Transport(BridgeError::NotAvailable("tls".into()));
        assert!(!unavailable.is_retryable());
    }

    #[test]
    fn test_auth_classification() {
        let rejected = GoogleDriveError::Auth(AuthError::AuthenticationFailed {
            status: 400,
            message: "invalid_grant".into(),
        });
        assert_eq!(rejected.class(), FailureClass::Fatal);
        assert_eq!(rejected.status(), Some(400));

        let unreachable = GoogleDriveError::Auth(AuthError::NetworkError("reset".into()));
        assert_eq!(unreachable.class(), FailureClass::Retryable);

        let unsent = GoogleDriveError::Auth(AuthError::RequestFailed("no http bridge".into()));
        assert_eq!(unsent.class(), FailureClass::Fatal);
    }

    #[test]
    fn test_vanished_file_is_retryable() {
        let error = GoogleDriveError::FileVanished {
            file_id: "abc".into(),
        };
        assert!(error.is_retryable());
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_local_file_is_fatal() {
        let error = GoogleDriveError::LocalFile {
            path: "a.zip".into(),
            message: "permission denied".into(),
        };
        assert_eq!(error.class(), FailureClass::Fatal);
        assert_eq!(error.status(), None);
    }
}
