//! Service account token exchange (RFC 7523 JWT bearer grant)
//!
//! A short-lived RS256 assertion is signed with the service account's private
//! key and posted to the token endpoint. The resulting bearer token is cached
//! until it is about to expire.

use crate::credentials::ServiceAccountKey;
use crate::error::{AuthError, Result};
use crate::types::AccessToken;
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::time::{Clock, SystemClock};
use bytes::Bytes;
use core_runtime::logging::redact_if_sensitive;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Per-file Drive access: files created or opened by this identity
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the signed assertion; Google caps this at one hour
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Source of bearer tokens for Drive requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token valid for at least the next minute
    async fn access_token(&self) -> Result<AccessToken>;
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges service account key material for Drive access tokens.
///
/// The private key is parsed once at construction, so a key that is not a
/// valid RSA PEM fails before any network traffic.
pub struct ServiceAccountTokenProvider {
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    encoding_key: EncodingKey,
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<AccessToken>>,
}

impl ServiceAccountTokenProvider {
    /// Build a provider for the Drive file scope.
    ///
    /// # Errors
    ///
    /// [`AuthError::MalformedCredentials`] if the private key cannot be parsed.
    pub fn new(key: ServiceAccountKey, http_client: Arc<dyn HttpClient>) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AuthError::MalformedCredentials(format!("private_key is not a usable RSA key: {}", e))
        })?;

        Ok(Self {
            client_email: key.client_email,
            token_uri: key.token_uri,
            key_id: key.private_key_id,
            encoding_key,
            http_client,
            clock: Arc::new(SystemClock),
            cached: Mutex::new(None),
        })
    }

    /// Use a custom time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sign the grant assertion for the given issue time.
    pub(crate) fn build_assertion(&self, issued_at: i64) -> Result<String> {
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: DRIVE_FILE_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))
    }

    /// Perform one token exchange, bypassing the cache.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AuthenticationFailed`] on any non-2xx response
    /// - [`AuthError::NetworkError`] if the endpoint cannot be reached
    /// - [`AuthError::InvalidTokenResponse`] if a 2xx body has no token
    pub async fn exchange(&self) -> Result<AccessToken> {
        let now = self.clock.now();
        let assertion = self.build_assertion(now.timestamp())?;

        let encoded_body = serde_urlencoded::to_string([
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ])
        .map_err(|e| AuthError::SigningFailed(format!("Failed to encode token request: {}", e)))?;

        debug!(
            identity = %redact_if_sensitive("client_email", &self.client_email),
            "Exchanging service account assertion for access token"
        );

        let request = HttpRequest::new(HttpMethod::Post, self.token_uri.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Bytes::from(encoded_body));

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| {
                if e.is_transient() {
                    AuthError::NetworkError(e.to_string())
                } else {
                    AuthError::RequestFailed(e.to_string())
                }
            })?;

        if !response.is_success() {
            let status = response.status;
            let message = error_message(&response.text_lossy());

            info!(status = status, error = %message, "Token exchange rejected");

            return Err(AuthError::AuthenticationFailed { status, message });
        }

        let token: TokenResponse = response
            .json()
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse(
                "access_token is empty".to_string(),
            ));
        }

        info!(expires_in = token.expires_in, "Obtained Drive access token");

        Ok(AccessToken::new(token.access_token, now, token.expires_in))
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<AccessToken> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired_at(self.clock.now()) {
                return Ok(token.clone());
            }
            debug!("Cached access token expired, refreshing");
        }

        let token = self.exchange().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Pull a readable message out of an OAuth error body, falling back to the raw text
fn error_message(body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(parsed) => match parsed.error_description {
            Some(description) => format!("{}: {}", parsed.error, description),
            None => parsed.error,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
