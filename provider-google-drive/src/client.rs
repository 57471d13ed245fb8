//! Drive capability trait
//!
//! The orchestrator only ever talks to Drive through [`DriveClient`], so the
//! retry and verification logic can run against in-memory fakes.

use crate::error::Result;
use crate::types::DriveFile;
use async_trait::async_trait;
use std::path::Path;

/// A file as seen in Drive after a lookup or write.
///
/// Never cached between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    /// First parent folder, when Drive reports one
    pub folder_id: Option<String>,
}

impl From<DriveFile> for RemoteFile {
    fn from(file: DriveFile) -> Self {
        Self {
            id: file.id,
            name: file.name,
            folder_id: file.parents.into_iter().next(),
        }
    }
}

/// Typed operations over the Drive API.
///
/// Each call is one logical exchange. Implementations never retry; every
/// error carries a [`FailureClass`](crate::error::FailureClass) instead.
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// First non-trashed file in `folder_id` whose name is exactly `name`.
    async fn find_by_name(&self, folder_id: &str, name: &str) -> Result<Option<RemoteFile>>;

    /// Upload `local_path` as a new file named `name` inside `folder_id`.
    async fn create_file(&self, folder_id: &str, name: &str, local_path: &Path)
        -> Result<RemoteFile>;

    /// Replace the content of `file_id`, keeping its id and name.
    async fn update_file(&self, file_id: &str, local_path: &Path) -> Result<RemoteFile>;

    /// Look a file up by id. `None` when Drive reports it missing.
    async fn get_by_id(&self, file_id: &str) -> Result<Option<RemoteFile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_file_from_drive_file() {
        let drive_file = DriveFile {
            id: "file1".to_string(),
            name: "a.zip".to_string(),
            parents: vec!["folder1".to_string(), "folder2".to_string()],
            size: Some("10".to_string()),
            created_time: None,
            trashed: false,
        };

        let remote: RemoteFile = drive_file.into();
        assert_eq!(remote.id, "file1");
        assert_eq!(remote.name, "a.zip");
        assert_eq!(remote.folder_id.as_deref(), Some("folder1"));
    }

    #[test]
    fn test_remote_file_without_parents() {
        let drive_file = DriveFile {
            id: "file1".to_string(),
            name: "a.zip".to_string(),
            parents: vec![],
            size: None,
            created_time: None,
            trashed: false,
        };

        assert_eq!(RemoteFile::from(drive_file).folder_id, None);
    }
}
