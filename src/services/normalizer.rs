//! Input normalization
//!
//! Turns every [`ImageInput`] variant into a [`NormalizedPayload`]: the bytes,
//! a content type and an upload file name.

use crate::error::{BgRemovalError, Result};
use crate::services::format;
use crate::services::io::FileSystem;
use crate::types::{ImageInput, NormalizedPayload};
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;

/// Converts caller inputs into upload payloads
#[derive(Debug, Clone)]
pub struct InputNormalizer {
    filesystem: Option<Arc<dyn FileSystem>>,
}

impl InputNormalizer {
    /// Normalizer with the given filesystem capability (`None` disables path inputs)
    pub fn new(filesystem: Option<Arc<dyn FileSystem>>) -> Self {
        Self { filesystem }
    }

    /// Whether path inputs can be read on this host
    pub fn has_filesystem(&self) -> bool {
        self.filesystem.is_some()
    }

    /// Normalize one input.
    ///
    /// # Errors
    /// - [`BgRemovalError::UnsupportedInput`] if a declared content type is not a MIME type
    /// - [`BgRemovalError::Environment`] for path inputs without filesystem access
    /// - [`BgRemovalError::Io`] if the file cannot be read
    pub async fn normalize(&self, input: ImageInput) -> Result<NormalizedPayload> {
        let payload = match input {
            ImageInput::Blob {
                data,
                content_type,
                name,
            } => Self::normalize_blob(data, content_type, name)?,
            ImageInput::Bytes(bytes) => Self::normalize_bytes(Bytes::from(bytes)),
            ImageInput::Buffer(buffer) => Self::normalize_bytes(buffer),
            ImageInput::Path(path) => self.normalize_path(&path).await?,
        };

        tracing::debug!(
            content_type = %payload.content_type,
            filename = %payload.filename,
            bytes = payload.data.len(),
            "Normalized image input"
        );
        Ok(payload)
    }

    fn normalize_blob(
        data: Bytes,
        content_type: String,
        name: Option<String>,
    ) -> Result<NormalizedPayload> {
        // An empty declared type counts as undeclared
        if content_type.trim().is_empty() {
            let mut payload = Self::normalize_bytes(data);
            if let Some(name) = name {
                payload.filename = name;
            }
            return Ok(payload);
        }

        if !format::is_valid_mime(&content_type) {
            return Err(BgRemovalError::unsupported_input(format!(
                "Declared content type '{}' is not a valid MIME type",
                content_type
            )));
        }

        let filename = name.unwrap_or_else(|| format::fallback_filename(&content_type));
        Ok(NormalizedPayload {
            data,
            content_type,
            filename,
        })
    }

    fn normalize_bytes(data: Bytes) -> NormalizedPayload {
        let content_type = format::detect_content_type(&data);
        NormalizedPayload {
            data,
            content_type: content_type.to_string(),
            filename: format::fallback_filename(content_type),
        }
    }

    async fn normalize_path(&self, path: &Path) -> Result<NormalizedPayload> {
        let filesystem = self.filesystem.as_ref().ok_or_else(|| {
            BgRemovalError::environment(format!(
                "Cannot read '{}': this host provides no filesystem access for path inputs",
                path.display()
            ))
        })?;

        let data = filesystem
            .read(path)
            .await
            .map_err(|e| BgRemovalError::file_io_error("read image file", path, &e))?;

        // Extension wins over the byte signature when both are available
        let content_type = format::content_type_from_path(path)
            .unwrap_or_else(|| format::detect_content_type(&data));

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format::fallback_filename(content_type));

        Ok(NormalizedPayload {
            data: Bytes::from(data),
            content_type: content_type.to_string(),
            filename,
        })
    }
}
