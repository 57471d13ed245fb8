//! Run result for the invoking pipeline

use core_service::UploadReport;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Environment variable naming the step output file in GitHub Actions
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// `key=value` lines describing the uploaded file
pub fn render(report: &UploadReport) -> String {
    format!("file-id={}\nfile-name={}\n", report.file_id, report.name)
}

/// Append the result lines to a step output file
pub fn append_to(path: &Path, report: &UploadReport) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(render(report).as_bytes())
}

/// Print the result to stdout and, when running under GitHub Actions, to the
/// step output file.
pub fn emit(report: &UploadReport) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(render(report).as_bytes())?;
    stdout.flush()?;

    if let Some(path) = std::env::var_os(GITHUB_OUTPUT_ENV) {
        append_to(Path::new(&path), report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> UploadReport {
        UploadReport {
            file_id: "1AbCdEf".to_string(),
            name: "build.zip".to_string(),
            attempts: 2,
            size: 1024,
        }
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&report()), "file-id=1AbCdEf\nfile-name=build.zip\n");
    }

    #[test]
    fn test_append_keeps_existing_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "earlier=value\n").unwrap();

        append_to(&path, &report()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "earlier=value\nfile-id=1AbCdEf\nfile-name=build.zip\n"
        );
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh");

        append_to(&path, &report()).unwrap();

        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("file-id="));
    }
}
