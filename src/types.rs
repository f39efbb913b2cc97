//! Core types for background removal API calls

use crate::error::{BgRemovalError, Result};
use crate::services::format;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Image supplied by the caller, in one of the supported representations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// In-memory image whose content type is already known
    Blob {
        data: Bytes,
        content_type: String,
        /// Optional file name sent with the upload
        name: Option<String>,
    },
    /// Raw bytes; the content type is inferred from the signature
    Bytes(Vec<u8>),
    /// Shared byte buffer; the content type is inferred from the signature
    Buffer(Bytes),
    /// Path to an image file, read through the filesystem capability
    Path(PathBuf),
}

impl ImageInput {
    /// Image at `path`
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self::Path(path.into())
    }

    /// Raw image bytes of unknown type
    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Shared buffer of unknown type
    pub fn from_buffer<B: Into<Bytes>>(buffer: B) -> Self {
        Self::Buffer(buffer.into())
    }

    /// Bytes with a declared content type
    pub fn blob<B: Into<Bytes>, S: Into<String>>(data: B, content_type: S) -> Self {
        Self::Blob {
            data: data.into(),
            content_type: content_type.into(),
            name: None,
        }
    }

    /// Bytes with a declared content type and file name
    pub fn named_blob<B: Into<Bytes>, S: Into<String>, N: Into<String>>(
        data: B,
        content_type: S,
        name: N,
    ) -> Self {
        Self::Blob {
            data: data.into(),
            content_type: content_type.into(),
            name: Some(name.into()),
        }
    }

    /// Short label for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Blob { data, content_type, .. } => {
                format!("blob ({}, {} bytes)", content_type, data.len())
            },
            Self::Bytes(bytes) => format!("bytes ({} bytes)", bytes.len()),
            Self::Buffer(buffer) => format!("buffer ({} bytes)", buffer.len()),
            Self::Path(path) => format!("path ({})", path.display()),
        }
    }
}

impl From<Vec<u8>> for ImageInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Bytes> for ImageInput {
    fn from(buffer: Bytes) -> Self {
        Self::Buffer(buffer)
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Canonical upload form of an [`ImageInput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPayload {
    pub data: Bytes,
    pub content_type: String,
    pub filename: String,
}

/// Metadata reported by the service alongside the output image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// `X-Request-ID`, empty when absent
    pub request_id: String,
    /// `X-Processing-Time-Ms`, 0 when absent
    pub processing_time_ms: u64,
    /// `X-Image-Width`, 0 when absent
    pub width: u32,
    /// `X-Image-Height`, 0 when absent
    pub height: u32,
    /// `Content-Type`, `image/png` when absent
    pub content_type: String,
}

/// Result of a successful background removal request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    /// Encoded output image
    pub data: Bytes,
    pub metadata: ProcessingMetadata,
}

impl ProcessingResult {
    #[must_use]
    pub fn new(data: Bytes, metadata: ProcessingMetadata) -> Self {
        Self { data, metadata }
    }

    /// File extension matching the output content type
    pub fn file_extension(&self) -> &'static str {
        format::extension_for_content_type(&self.metadata.content_type)
    }

    /// Write the output image to `path`, creating parent directories
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    BgRemovalError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }

        tokio::fs::write(path_ref, &self.data)
            .await
            .map_err(|e| BgRemovalError::file_io_error("write output image", path_ref, &e))?;

        tracing::debug!(
            path = %path_ref.display(),
            bytes = self.data.len(),
            "Saved output image"
        );
        Ok(())
    }
}

/// Account details returned by `GET /me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub organization_id: String,
    pub plan: String,
    pub max_credits: u64,
    pub used_credits: u64,
    /// Credit level that triggers an automatic top-up, `None` when disabled
    pub auto_recharge_threshold: Option<u64>,
}

impl AccountInfo {
    pub fn remaining_credits(&self) -> u64 {
        self.max_credits.saturating_sub(self.used_credits)
    }
}

/// JSON body of a failing API response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}
