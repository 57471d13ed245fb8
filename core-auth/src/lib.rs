//! # Authentication Module
//!
//! Service-account authentication for the Drive API.
//!
//! ## Overview
//!
//! 1. [`ServiceAccountKey::from_base64`] decodes the pipeline-supplied key blob
//! 2. [`ServiceAccountTokenProvider`] signs an RS256 JWT assertion with the key
//! 3. The assertion is exchanged at the key's token endpoint for a bearer token
//! 4. The token is cached and re-exchanged once it is about to expire
//!
//! Nothing here retries. A rejected credential stays rejected.

pub mod credentials;
pub mod error;
pub mod service_account;
pub mod types;

pub use credentials::{ServiceAccountKey, DEFAULT_TOKEN_URI};
pub use error::{AuthError, Result};
pub use service_account::{ServiceAccountTokenProvider, TokenProvider, DRIVE_FILE_SCOPE};
pub use types::AccessToken;
