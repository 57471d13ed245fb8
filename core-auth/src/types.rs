use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Seconds before the real expiry at which a token is treated as expired
const EXPIRY_BUFFER_SECS: i64 = 60;

/// Short-lived bearer token issued for the service account.
///
/// # Security
///
/// The `Debug` implementation redacts the token value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Bearer token sent in the `Authorization` header
    pub value: String,
    /// When the token expires (UTC)
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token that expires `expires_in` seconds after `issued_at`
    pub fn new(value: String, issued_at: DateTime<Utc>, expires_in: i64) -> Self {
        Self {
            value,
            expires_at: issued_at + Duration::seconds(expires_in),
        }
    }

    /// Whether the token is expired, or close enough to expiry that it should
    /// not be sent again
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - Duration::seconds(EXPIRY_BUFFER_SECS)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
