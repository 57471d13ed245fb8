//! Upload service façade.
//!
//! This crate wires the host-provided HTTP bridge into the credential
//! resolver, the Drive connector and the upload orchestrator, and runs one
//! upload from start to finish.

pub mod error;

pub use error::{Result, ServiceError};

use std::sync::Arc;

use bridge_traits::{
    http::HttpClient,
    time::{Clock, SystemClock},
};
use core_auth::{ServiceAccountKey, ServiceAccountTokenProvider, TokenProvider};
use core_runtime::{config::UploadConfig, logging::strip_path};
use core_upload::UploadOrchestrator;
use provider_google_drive::GoogleDriveConnector;
use tracing::{debug, info, warn};

/// Bridge handles the service needs from its host.
pub struct ServiceDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
}

impl ServiceDependencies {
    /// Dependencies using the system clock.
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Result of a verified upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub file_id: String,
    pub name: String,
    pub attempts: u32,
    /// Local file size in bytes
    pub size: u64,
}

/// Primary façade exposed to the command line.
pub struct UploadService {
    deps: ServiceDependencies,
}

impl UploadService {
    pub fn new(deps: ServiceDependencies) -> Self {
        Self { deps }
    }

    /// Upload one file.
    ///
    /// Steps, each failing fast:
    /// 1. The local file must exist
    /// 2. The credential blob must decode (no network traffic before this)
    /// 3. The service account must authenticate
    /// 4. The orchestrator runs its retry/verify loop
    ///
    /// In verbose mode a failed run also lists the target folder.
    pub async fn upload(&self, credentials_base64: &str, config: UploadConfig) -> Result<UploadReport> {
        let size = check_local_file(&config).await?;
        info!(
            file = %strip_path(&config.file_path.to_string_lossy()),
            size = size,
            target = %config.target_name,
            "Local file ready"
        );

        let key = ServiceAccountKey::from_base64(credentials_base64)?;
        let tokens = ServiceAccountTokenProvider::new(key, Arc::clone(&self.deps.http_client))?
            .with_clock(Arc::clone(&self.deps.clock));

        // Authenticate once up front so bad credentials never reach the retry loop
        tokens.access_token().await?;
        debug!("Service account authenticated");

        let connector = Arc::new(GoogleDriveConnector::new(
            Arc::clone(&self.deps.http_client),
            Arc::new(tokens),
        ));

        let verbose = config.verbose;
        let folder_id = config.folder_id.clone();
        let orchestrator = UploadOrchestrator::new(connector.clone(), config);

        match orchestrator.run().await {
            Ok(outcome) => Ok(UploadReport {
                file_id: outcome.file.id,
                name: outcome.file.name,
                attempts: outcome.attempts,
                size,
            }),
            Err(error) => {
                if verbose {
                    log_folder_contents(&connector, &folder_id).await;
                }
                Err(error.into())
            }
        }
    }
}

async fn check_local_file(config: &UploadConfig) -> Result<u64> {
    let missing = || ServiceError::LocalFileMissing {
        path: config.file_path.display().to_string(),
    };

    match tokio::fs::metadata(&config.file_path).await {
        Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
        Ok(_) => Err(missing()),
        Err(e) => {
            debug!(error = %e, "Local file lookup failed");
            Err(missing())
        }
    }
}

async fn log_folder_contents(connector: &GoogleDriveConnector, folder_id: &str) {
    match connector.list_folder(folder_id).await {
        Ok(files) => {
            info!(count = files.len(), "Target folder contents");
            for file in files {
                info!(
                    id = %file.id,
                    name = %file.name,
                    size = ?file.size_bytes(),
                    created = ?file.created_at(),
                    "Folder entry"
                );
            }
        }
        Err(e) => warn!(error = %e, "Could not list target folder"),
    }
}
