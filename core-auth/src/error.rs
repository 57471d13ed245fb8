use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The key blob could not be decoded or lacks a required field
    #[error("Malformed service account credentials: {0}")]
    MalformedCredentials(String),

    /// The token endpoint rejected the assertion
    #[error("Authentication failed (status {status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    /// The token endpoint could not be reached
    #[error("Token endpoint unreachable: {0}")]
    NetworkError(String),

    /// The host could not send the token request at all
    #[error("Token request could not be sent: {0}")]
    RequestFailed(String),

    #[error("Failed to sign token assertion: {0}")]
    SigningFailed(String),

    #[error("Unexpected token response: {0}")]
    InvalidTokenResponse(String),
}

impl AuthError {
    /// Transport failures may clear up; everything else is a credential problem.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::NetworkError(_))
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
