//! Command-line arguments

use clap::Parser;
use core_runtime::config::{UploadConfig, DEFAULT_MAX_ATTEMPTS};
use core_runtime::logging::LogFormat;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "drive-upload", version)]
#[command(about = "Upload a file to Google Drive with retry and verification")]
pub struct Args {
    /// Local file to upload
    #[arg(long, short = 'f')]
    pub filename: PathBuf,

    /// Base64-encoded service account key file
    #[arg(long, env = "DRIVE_CREDENTIALS", hide_env_values = true)]
    pub credentials_base64: String,

    /// Destination folder id (Shared Drive folders included)
    #[arg(long, env = "DRIVE_FOLDER_ID")]
    pub folder_id: String,

    /// Name to store the file under; defaults to the local file name
    #[arg(long)]
    pub target_name: Option<String>,

    /// Total upload attempts, first included
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Replace the content of an existing file with the same name
    #[arg(long)]
    pub overwrite: bool,

    /// Log every attempt and print raw Drive errors on failure
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Log output format: compact, pretty or json
    #[arg(long, default_value = "compact")]
    pub log_format: LogFormat,
}

impl Args {
    pub fn to_config(&self) -> core_runtime::Result<UploadConfig> {
        let mut builder = UploadConfig::builder()
            .file_path(&self.filename)
            .folder_id(self.folder_id.trim())
            .max_attempts(self.max_attempts)
            .retry_delay(Duration::from_secs(self.retry_delay))
            .request_timeout(Duration::from_secs(self.timeout))
            .overwrite(self.overwrite)
            .verbose(self.verbose);

        if let Some(name) = &self.target_name {
            builder = builder.target_name(name);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec![
            "drive-upload",
            "--filename",
            "/builds/Build-StandaloneWindows64-v0.1.8.zip",
            "--credentials-base64",
            "e30=",
            "--folder-id",
            "folder-1",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config.target_name, "Build-StandaloneWindows64-v0.1.8.zip");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(!config.overwrite);
        assert!(!config.verbose);
        assert_eq!(args.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_all_options() {
        let args = parse(&[
            "--target-name",
            "latest.zip",
            "--max-attempts",
            "15",
            "--retry-delay",
            "45",
            "--timeout",
            "120",
            "--overwrite",
            "--verbose",
            "--log-format",
            "json",
        ])
        .unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config.target_name, "latest.zip");
        assert_eq!(config.max_attempts, 15);
        assert_eq!(config.retry_delay, Duration::from_secs(45));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.overwrite);
        assert!(config.verbose);
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(parse(&["--max-attempts", "0"]).is_err());
    }

    #[test]
    fn test_zero_retry_delay_allowed() {
        let config = parse(&["--retry-delay", "0"]).unwrap().to_config().unwrap();
        assert!(config.retry_delay.is_zero());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse(&["--timeout", "0"]).is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        assert!(parse(&["--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_separator_in_target_name_rejected() {
        let args = parse(&["--target-name", "nested/latest.zip"]).unwrap();
        assert!(args.to_config().is_err());
    }
}
