use provider_google_drive::GoogleDriveError;
use thiserror::Error;

/// Terminal failures of an upload run
#[derive(Error, Debug)]
pub enum UploadError {
    /// A file with the target name exists and overwriting was not requested
    #[error("A file named '{name}' already exists in the folder (id {existing_id})")]
    FileAlreadyExists { name: String, existing_id: String },

    /// A non-retryable Drive failure
    #[error(transparent)]
    Drive(#[from] GoogleDriveError),

    /// The written file never became visible
    #[error("File {file_id} was not visible after upload ({attempts} attempts)")]
    VerificationFailed { file_id: String, attempts: u32 },

    /// Every attempt ended in a retryable failure
    #[error("Upload failed after {attempts} attempts: {last_error}")]
    MaxAttemptsExceeded {
        attempts: u32,
        last_error: Box<GoogleDriveError>,
    },
}

impl UploadError {
    /// Short name of the failure for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::FileAlreadyExists { .. } => "FileAlreadyExists",
            UploadError::Drive(e) => drive_error_kind(e),
            UploadError::VerificationFailed { .. } => "VerificationFailed",
            UploadError::MaxAttemptsExceeded { .. } => "MaxAttemptsExceeded",
        }
    }

    /// The Drive error behind this failure, if any
    pub fn drive_error(&self) -> Option<&GoogleDriveError> {
        match self {
            UploadError::Drive(e) => Some(e),
            UploadError::MaxAttemptsExceeded { last_error, .. } => Some(last_error.as_ref()),
            _ => None,
        }
    }
}

fn drive_error_kind(error: &GoogleDriveError) -> &'static str {
    match error {
        GoogleDriveError::QueryFailed { .. } => "QueryFailed",
        GoogleDriveError::UploadRejected { .. }
        | GoogleDriveError::FileVanished { .. }
        | GoogleDriveError::UploadStalled { .. } => "UploadRejected",
        GoogleDriveError::Auth(_) => "AuthenticationFailed",
        GoogleDriveError::Transport(_) => "TransportError",
        GoogleDriveError::LocalFile { .. } => "LocalFileUnreadable",
        GoogleDriveError::ParseError(_) => "UnexpectedResponse",
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let exists = UploadError::FileAlreadyExists {
            name: "a.zip".into(),
            existing_id: "1".into(),
        };
        assert_eq!(exists.kind(), "FileAlreadyExists");
        assert!(exists.drive_error().is_none());

        let rejected = UploadError::Drive(GoogleDriveError::UploadRejected {
            status: 400,
            body: "Bad Request".into(),
        });
        assert_eq!(rejected.kind(), "UploadRejected");

        let exhausted = UploadError::MaxAttemptsExceeded {
            attempts: 3,
            last_error: Box::new(GoogleDriveError::QueryFailed {
                status: 503,
                body: String::new(),
            }),
        };
        assert_eq!(exhausted.kind(), "MaxAttemptsExceeded");
        assert_eq!(exhausted.drive_error().and_then(|e| e.status()), Some(503));
    }

    #[test]
    fn test_display_includes_last_error() {
        let error = UploadError::MaxAttemptsExceeded {
            attempts: 3,
            last_error: Box::new(GoogleDriveError::UploadRejected {
                status: 503,
                body: "backend error".into(),
            }),
        };

        assert_eq!(
            error.to_string(),
            "Upload failed after 3 attempts: Drive rejected the upload (status 503): backend error"
        );
    }
}
