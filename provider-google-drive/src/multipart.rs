//! `multipart/related` body for Drive's single-request uploads
//!
//! See: https://developers.google.com/drive/api/guides/manage-uploads#multipart

use crate::error::{GoogleDriveError, Result};
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

/// One metadata part followed by one content part
#[derive(Debug, Clone)]
pub struct MultipartRelated {
    boundary: String,
}

impl MultipartRelated {
    pub fn new() -> Self {
        Self::with_boundary(format!("drive-upload-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
        }
    }

    /// Value for the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    pub fn encode<M: Serialize>(
        &self,
        metadata: &M,
        content_type: &str,
        content: &[u8],
    ) -> Result<Bytes> {
        let metadata = serde_json::to_vec(metadata)
            .map_err(|e| GoogleDriveError::ParseError(format!("Failed to encode metadata: {}", e)))?;

        let mut body = BytesMut::with_capacity(content.len() + metadata.len() + 256);

        body.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
        body.put_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.put_slice(&metadata);
        body.put_slice(b"\r\n");

        body.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
        body.put_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.put_slice(content);
        body.put_slice(b"\r\n");

        body.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        Ok(body.freeze())
    }
}

impl Default for MultipartRelated {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_layout() {
        let multipart = MultipartRelated::with_boundary("XYZ");
        let body = multipart
            .encode(&json!({"name": "a.txt"}), "text/plain", b"hello")
            .unwrap();

        let expected = "--XYZ\r\n\
            Content-Type: application/json; charset=UTF-8\r\n\r\n\
            {\"name\":\"a.txt\"}\r\n\
            --XYZ\r\n\
            Content-Type: text/plain\r\n\r\n\
            hello\r\n\
            --XYZ--\r\n";
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), expected);
        assert_eq!(multipart.content_type(), "multipart/related; boundary=XYZ");
    }

    #[test]
    fn test_binary_content_is_preserved() {
        let content = [0u8, 159, 146, 150, 255];
        let body = MultipartRelated::with_boundary("B")
            .encode(&json!({}), "application/octet-stream", &content)
            .unwrap();

        assert!(body.windows(content.len()).any(|w| w == content));
    }

    #[test]
    fn test_generated_boundaries_differ() {
        let a = MultipartRelated::new();
        let b = MultipartRelated::new();
        assert_ne!(a.content_type(), b.content_type());
        assert!(a
            .content_type()
            .starts_with("multipart/related; boundary=drive-upload-"));
    }
}
