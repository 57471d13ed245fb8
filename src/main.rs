//! `drive-upload`: push one build artifact to Google Drive.
//!
//! Exit status is 0 when the file was uploaded and verified, 1 otherwise.

mod cli;
mod output;

use anyhow::Context;
use bridge_desktop::ReqwestHttpClient;
use clap::Parser;
use cli::Args;
use core_runtime::logging::{init_logging, LoggingConfig};
use core_service::{ServiceDependencies, ServiceError, UploadReport, UploadService};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let logging = LoggingConfig::for_verbosity(args.verbose).with_format(args.log_format);
    if let Err(e) = init_logging(logging) {
        eprintln!("Warning: {}", e);
    }

    match run(&args).await {
        Ok(report) => {
            info!(
                file_id = %report.file_id,
                attempts = report.attempts,
                bytes = report.size,
                "Upload complete"
            );
            match output::emit(&report) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Uploaded {} but could not write outputs: {}", report.file_id, e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            match e.downcast_ref::<ServiceError>() {
                Some(service_error) => eprintln!("{}", service_error.diagnostic(args.verbose)),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<UploadReport> {
    let config = args.to_config().map_err(ServiceError::from)?;
    debug!(?config, "Resolved configuration");

    let http_client = ReqwestHttpClient::with_timeout(config.request_timeout)
        .context("Failed to initialise HTTP client")?;

    let service = UploadService::new(ServiceDependencies::new(Arc::new(http_client)));
    let report = service.upload(&args.credentials_base64, config).await?;
    Ok(report)
}
