//! What a run writes to the log at each verbosity.

use async_trait::async_trait;
use core_runtime::config::UploadConfig;
use core_runtime::logging::{build_filter, LoggingConfig};
use core_upload::{UploadError, UploadOrchestrator};
use provider_google_drive::{DriveClient, GoogleDriveError, RemoteFile, Result};
use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::subscriber::DefaultGuard;

/// Log sink shared with the subscriber
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Install the run's real filter on this thread and capture what passes it
fn capture(verbose: bool) -> (Captured, DefaultGuard) {
    let captured = Captured::default();
    let writer = captured.clone();
    let filter = build_filter(&LoggingConfig::for_verbosity(verbose)).unwrap();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    (captured, tracing::subscriber::set_default(subscriber))
}

/// Drive whose creates fail with the queued errors, then succeed
struct FailingCreates {
    failures: Mutex<VecDeque<GoogleDriveError>>,
}

impl FailingCreates {
    fn new(failures: impl IntoIterator<Item = GoogleDriveError>) -> Arc<Self> {
        Arc::new(Self {
            failures: Mutex::new(failures.into_iter().collect()),
        })
    }
}

fn remote(id: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: "build.zip".to_string(),
        folder_id: Some("folder-1".to_string()),
    }
}

#[async_trait]
impl DriveClient for FailingCreates {
    async fn find_by_name(&self, _folder_id: &str, _name: &str) -> Result<Option<RemoteFile>> {
        Ok(None)
    }

    async fn create_file(&self, _folder_id: &str, _name: &str, _local_path: &Path) -> Result<RemoteFile> {
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(remote("new-id")),
        }
    }

    async fn update_file(&self, file_id: &str, _local_path: &Path) -> Result<RemoteFile> {
        Ok(remote(file_id))
    }

    async fn get_by_id(&self, file_id: &str) -> Result<Option<RemoteFile>> {
        Ok(Some(remote(file_id)))
    }
}

fn unavailable() -> GoogleDriveError {
    GoogleDriveError::UploadRejected {
        status: 503,
        body: "RAW-BODY".to_string(),
    }
}

fn config(verbose: bool) -> UploadConfig {
    UploadConfig::builder()
        .file_path("/builds/build.zip")
        .folder_id("folder-1")
        .retry_delay(Duration::from_secs(5))
        .verbose(verbose)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn quiet_run_does_not_log_retried_attempts() {
    let (captured, _guard) = capture(false);
    let drive = FailingCreates::new([unavailable(), unavailable()]);

    let outcome = UploadOrchestrator::new(drive, config(false))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 3);
    assert_eq!(captured.text(), "");
}

#[tokio::test(start_paused = true)]
async fn quiet_run_leaves_failures_to_the_final_report() {
    let (captured, _guard) = capture(false);
    let drive = FailingCreates::new([GoogleDriveError::UploadRejected {
        status: 400,
        body: "RAW-BODY".to_string(),
    }]);

    let error = UploadOrchestrator::new(drive, config(false))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(error, UploadError::Drive(_)));
    assert_eq!(captured.text(), "");
}

#[tokio::test(start_paused = true)]
async fn quiet_run_does_not_log_exhausted_budget() {
    let (captured, _guard) = capture(false);
    let drive = FailingCreates::new([unavailable(), unavailable(), unavailable()]);

    let error = UploadOrchestrator::new(drive, config(false))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(error, UploadError::MaxAttemptsExceeded { .. }));
    assert_eq!(captured.text(), "");
}

#[tokio::test(start_paused = true)]
async fn verbose_run_logs_every_retry() {
    let (captured, _guard) = capture(true);
    let drive = FailingCreates::new([unavailable(), unavailable()]);

    UploadOrchestrator::new(drive, config(true))
        .run()
        .await
        .unwrap();

    let output = captured.text();
    assert_eq!(output.matches("Attempt failed, retrying").count(), 2);
    assert!(output.contains("RAW-BODY"));
    assert!(output.contains("Upload verified"));
}
