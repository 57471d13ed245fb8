//! Google Drive API connector implementation
//!
//! Implements [`DriveClient`] for Google Drive API v3, including Shared Drives.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_auth::TokenProvider;
use core_runtime::logging::strip_path;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, instrument};

use crate::client::{DriveClient, RemoteFile};
use crate::error::{GoogleDriveError, Result};
use crate::multipart::MultipartRelated;
use crate::types::{DriveFile, FilesListResponse, NewFileMetadata};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive upload endpoint base URL
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Fields to request for file resources
const FILE_FIELDS: &str = "id,name,parents";

/// Fields to request when verifying a file
const VERIFY_FIELDS: &str = "id,name,parents,trashed";

/// Fields to request when listing a folder for diagnostics
const LISTING_FIELDS: &str = "nextPageToken,files(id,name,size,createdTime)";

/// Page size for folder listings
const LISTING_PAGE_SIZE: u32 = 100;

/// Files larger than this use a resumable session
pub const RESUMABLE_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Bytes per resumable chunk; Drive requires a multiple of 256 KiB
pub const CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Google Drive API connector
///
/// # Features
///
/// - Exact-name lookups scoped to one folder, across Shared Drives
/// - Multipart create and media update for small files
/// - Resumable chunked create/update for large files, within one call
/// - Bearer tokens pulled from a [`TokenProvider`] per request, so an expired
///   token is refreshed lazily
///
/// The connector never retries. Every error is classified through
/// [`GoogleDriveError::class`] and the caller decides.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::{DriveClient, GoogleDriveConnector};
///
/// let connector = GoogleDriveConnector::new(http_client, token_provider);
/// let existing = connector.find_by_name("folder-id", "build.zip").await?;
/// ```
pub struct GoogleDriveConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Source of bearer tokens
    token_provider: Arc<dyn TokenProvider>,

    resumable_threshold: u64,
    chunk_size: usize,
}

impl GoogleDriveConnector {
    /// Create a new Google Drive connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `token_provider` - Tokens with the `drive.file` scope
    pub fn new(http_client: Arc<dyn HttpClient>, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            http_client,
            token_provider,
            resumable_threshold: RESUMABLE_THRESHOLD,
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Size above which uploads switch to a resumable session
    pub fn with_resumable_threshold(mut self, bytes: u64) -> Self {
        self.resumable_threshold = bytes;
        self
    }

    /// Chunk size for resumable sessions. Every chunk but the last must be a
    /// multiple of 256 KiB for Drive to accept it.
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    /// Attach a fresh bearer token and send the request
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let token = self.token_provider.access_token().await?;
        let response = self
            .http_client
            .execute(request.bearer_token(&token.value))
            .await?;
        Ok(response)
    }

    fn parse_file(response: &HttpResponse) -> Result<DriveFile> {
        response.json().map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse file resource: {}", e))
        })
    }

    /// Content type of the bytes being sent, guessed from the local file
    fn content_type_for(path: &Path) -> String {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    async fn local_size(path: &Path) -> Result<u64> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| local_error(path, e))?;
        Ok(metadata.len())
    }

    async fn read_local(path: &Path) -> Result<Bytes> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| local_error(path, e))?;
        Ok(Bytes::from(content))
    }

    /// List every non-trashed child of a folder.
    ///
    /// Used for diagnostics after a failed run; not part of the upload path.
    #[instrument(skip(self), fields(folder_id = %folder_id))]
    pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let query = format!(
            "'{}' in parents and trashed = false",
            escape_query_value(folder_id)
        );

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/files?q={}&fields={}&pageSize={}&orderBy=name&supportsAllDrives=true&includeItemsFromAllDrives=true&corpora=allDrives",
                DRIVE_API_BASE,
                urlencoding::encode(&query),
                LISTING_FIELDS,
                LISTING_PAGE_SIZE
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self.send(HttpRequest::new(HttpMethod::Get, url)).await?;
            if !response.is_success() {
                return Err(GoogleDriveError::QueryFailed {
                    status: response.status,
                    body: response.text_lossy(),
                });
            }

            let page: FilesListResponse = response.json().map_err(|e| {
                GoogleDriveError::ParseError(format!("Failed to parse files list response: {}", e))
            })?;

            files.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = files.len(), "Listed folder contents");
        Ok(files)
    }

    async fn create_multipart(&self, folder_id: &str, name: &str, path: &Path) -> Result<DriveFile> {
        let content = Self::read_local(path).await?;
        let multipart = MultipartRelated::new();
        let body = multipart.encode(
            &NewFileMetadata {
                name,
                parents: [folder_id],
            },
            &Self::content_type_for(path),
            &content,
        )?;

        let url = format!(
            "{}/files?uploadType=multipart&supportsAllDrives=true&fields={}",
            DRIVE_UPLOAD_BASE, FILE_FIELDS
        );
        let request = HttpRequest::new(HttpMethod::Post, url)
            .header("Content-Type", multipart.content_type())
            .body(body);

        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(GoogleDriveError::UploadRejected {
                status: response.status,
                body: response.text_lossy(),
            });
        }

        Self::parse_file(&response)
    }

    async fn update_media(&self, file_id: &str, path: &Path) -> Result<DriveFile> {
        let content = Self::read_local(path).await?;
        let content_type = Self::content_type_for(path);

        let url = format!(
            "{}/files/{}?uploadType=media&supportsAllDrives=true&fields={}",
            DRIVE_UPLOAD_BASE,
            urlencoding::encode(file_id),
            FILE_FIELDS
        );
        let request = HttpRequest::new(HttpMethod::Patch, url)
            .header("Content-Type", content_type)
            .body(content);

        let response = self.send(request).await?;
        match response.status {
            404 => Err(GoogleDriveError::FileVanished {
                file_id: file_id.to_string(),
            }),
            _ if response.is_success() => Self::parse_file(&response),
            status => Err(GoogleDriveError::UploadRejected {
                status,
                body: response.text_lossy(),
            }),
        }
    }

    /// Open a resumable session and return its upload URL.
    ///
    /// `file_id` selects an update of an existing file; otherwise a new file
    /// is created from `metadata`.
    async fn start_session(
        &self,
        file_id: Option<&str>,
        metadata: &impl serde::Serialize,
        content_type: &str,
        size: u64,
    ) -> Result<String> {
        let (method, url) = match file_id {
            Some(id) => (
                HttpMethod::Patch,
                format!(
                    "{}/files/{}?uploadType=resumable&supportsAllDrives=true&fields={}",
                    DRIVE_UPLOAD_BASE,
                    urlencoding::encode(id),
                    FILE_FIELDS
                ),
            ),
            None => (
                HttpMethod::Post,
                format!(
                    "{}/files?uploadType=resumable&supportsAllDrives=true&fields={}",
                    DRIVE_UPLOAD_BASE, FILE_FIELDS
                ),
            ),
        };

        let request = HttpRequest::new(method, url)
            .json(metadata)?
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", size.to_string());

        let response = self.send(request).await?;

        if response.status == 404 {
            if let Some(id) = file_id {
                return Err(GoogleDriveError::FileVanished {
                    file_id: id.to_string(),
                });
            }
        }
        if !response.is_success() {
            return Err(GoogleDriveError::UploadRejected {
                status: response.status,
                body: response.text_lossy(),
            });
        }

        response
            .header("Location")
            .map(str::to_string)
            .ok_or_else(|| {
                GoogleDriveError::ParseError("Resumable session has no Location header".to_string())
            })
    }

    /// Send the file in chunks, following the server's `Range` acknowledgements.
    async fn upload_chunks(&self, session_url: &str, path: &Path, total: u64) -> Result<DriveFile> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| local_error(path, e))?;
        let mut offset: u64 = 0;

        loop {
            let len = (total - offset).min(self.chunk_size as u64) as usize;
            let mut chunk = vec![0u8; len];
            file.seek(SeekFrom::Start(offset))
                .await
                .map_err(|e| local_error(path, e))?;
            file.read_exact(&mut chunk)
                .await
                .map_err(|e| local_error(path, e))?;

            let end = offset + len as u64 - 1;
            debug!(start = offset, end = end, total = total, "Uploading chunk");

            // The session URL authorizes the upload on its own
            let request = HttpRequest::new(HttpMethod::Put, session_url)
                .header("Content-Range", format!("bytes {}-{}/{}", offset, end, total))
                .body(Bytes::from(chunk));
            let response = self.http_client.execute(request).await?;

            match response.status {
                200 | 201 => return Self::parse_file(&response),
                308 => {
                    let next = response
                        .header("Range")
                        .and_then(parse_range_end)
                        .map(|last| last + 1)
                        .unwrap_or(0);
                    if next <= offset || next >= total {
                        debug!(offset = offset, acknowledged = next, "Resumable session stalled");
                        return Err(GoogleDriveError::UploadStalled { offset });
                    }
                    offset = next;
                }
                status => {
                    return Err(GoogleDriveError::UploadRejected {
                        status,
                        body: response.text_lossy(),
                    })
                }
            }
        }
    }
}

#[async_trait]
impl DriveClient for GoogleDriveConnector {
    #[instrument(skip(self), fields(folder_id = %folder_id))]
    async fn find_by_name(&self, folder_id: &str, name: &str) -> Result<Option<RemoteFile>> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_query_value(name),
            escape_query_value(folder_id)
        );
        let url = format!(
            "{}/files?q={}&fields=files({})&supportsAllDrives=true&includeItemsFromAllDrives=true&corpora=allDrives",
            DRIVE_API_BASE,
            urlencoding::encode(&query),
            FILE_FIELDS
        );

        let response = self.send(HttpRequest::new(HttpMethod::Get, url)).await?;
        if !response.is_success() {
            return Err(GoogleDriveError::QueryFailed {
                status: response.status,
                body: response.text_lossy(),
            });
        }

        let list: FilesListResponse = response.json().map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse files list response: {}", e))
        })?;

        if list.files.len() > 1 {
            info!(matches = list.files.len(), "Several files share this name, using the first");
        }

        let found = list.files.into_iter().next().map(RemoteFile::from);
        debug!(found = ?found.as_ref().map(|f| &f.id), "Resolved existing file");
        Ok(found)
    }

    #[instrument(skip(self, local_path), fields(folder_id = %folder_id, name = %name))]
    async fn create_file(&self, folder_id: &str, name: &str, local_path: &Path) -> Result<RemoteFile> {
        let size = Self::local_size(local_path).await?;

        let file = if size > self.resumable_threshold {
            info!(size = size, "Creating file with resumable upload");
            let metadata = NewFileMetadata {
                name,
                parents: [folder_id],
            };
            let session = self
                .start_session(None, &metadata, &Self::content_type_for(local_path), size)
                .await?;
            self.upload_chunks(&session, local_path, size).await?
        } else {
            info!(size = size, file = %strip_path(&local_path.to_string_lossy()), "Creating file with multipart upload");
            self.create_multipart(folder_id, name, local_path).await?
        };

        info!(file_id = %file.id, "File created");
        Ok(file.into())
    }

    #[instrument(skip(self, local_path), fields(file_id = %file_id))]
    async fn update_file(&self, file_id: &str, local_path: &Path) -> Result<RemoteFile> {
        let size = Self::local_size(local_path).await?;

        let file = if size > self.resumable_threshold {
            info!(size = size, "Updating file with resumable upload");
            let content_type = Self::content_type_for(local_path);
            let session = self
                .start_session(Some(file_id), &serde_json::json!({}), &content_type, size)
                .await?;
            self.upload_chunks(&session, local_path, size).await?
        } else {
            info!(size = size, "Updating file content");
            self.update_media(file_id, local_path).await?
        };

        info!("File content replaced");
        Ok(file.into())
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn get_by_id(&self, file_id: &str) -> Result<Option<RemoteFile>> {
        let url = format!(
            "{}/files/{}?fields={}&supportsAllDrives=true",
            DRIVE_API_BASE,
            urlencoding::encode(file_id),
            VERIFY_FIELDS
        );

        let response = self.send(HttpRequest::new(HttpMethod::Get, url)).await?;
        if response.status == 404 {
            debug!("File not visible");
            return Ok(None);
        }
        if !response.is_success() {
            return Err(GoogleDriveError::QueryFailed {
                status: response.status,
                body: response.text_lossy(),
            });
        }

        let file = Self::parse_file(&response)?;
        if file.trashed {
            debug!("File is in the trash");
            return Ok(None);
        }

        Ok(Some(file.into()))
    }
}

fn local_error(path: &Path, error: std::io::Error) -> GoogleDriveError {
    GoogleDriveError::LocalFile {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// Escape a value for use inside a single-quoted Drive query string
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Last acknowledged byte from a `Range: bytes=0-<n>` header
fn parse_range_end(range: &str) -> Option<u64> {
    range
        .trim()
        .strip_prefix("bytes=")?
        .split_once('-')?
        .1
        .parse()
        .ok()
}
