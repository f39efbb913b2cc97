//! Error handling and edge case testing
//!
//! Covers classification of every documented error code, boundary inputs for
//! signature sniffing and substituted filesystem capabilities.

use async_trait::async_trait;
use bgremove_api::{
    classify, kind_for_code, ApiErrorPayload, BgRemovalError, ClientConfig, ErrorKind,
    FileSystem, ImageInput, InputNormalizer,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// In-memory filesystem standing in for hosts with a virtual file store
#[derive(Debug, Default)]
struct MemoryFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
    fn with_file(mut self, path: &str, bytes: &[u8]) -> Self {
        self.files.insert(PathBuf::from(path), bytes.to_vec());
        self
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "not in memory filesystem")
        })
    }
}

fn memory_normalizer(fs: MemoryFileSystem) -> InputNormalizer {
    InputNormalizer::new(Some(Arc::new(fs)))
}

#[test]
fn test_every_documented_code_is_classified() {
    let expected = [
        ("authentication_error", ErrorKind::Authentication),
        ("permission_denied", ErrorKind::Permission),
        ("payment_required", ErrorKind::PaymentRequired),
        ("rate_limit_exceeded", ErrorKind::RateLimit),
        ("validation_error", ErrorKind::Validation),
        ("missing_image", ErrorKind::Validation),
        ("image_too_large", ErrorKind::Validation),
        ("upstream_error", ErrorKind::Server),
        ("internal_server_error", ErrorKind::Server),
    ];
    for (code, kind) in expected {
        assert_eq!(kind_for_code(code), kind, "code {}", code);
    }
}

#[test]
fn test_code_matching_is_exact() {
    // Codes are matched verbatim, no case folding or trimming
    assert_eq!(kind_for_code("Payment_Required"), ErrorKind::Unclassified);
    assert_eq!(kind_for_code(" validation_error"), ErrorKind::Unclassified);
    assert_eq!(kind_for_code(""), ErrorKind::Unclassified);
}

#[test]
fn test_classify_preserves_fields_and_is_idempotent() {
    let payload = ApiErrorPayload {
        code: "image_too_large".to_string(),
        message: "Image exceeds 25 MB".to_string(),
        details: Some("max_bytes=26214400".to_string()),
        request_id: Some("req_big".to_string()),
    };

    let first = classify(&payload, 413);
    let second = classify(&payload, 413);
    assert_eq!(first, second);
    assert_eq!(first.kind, ErrorKind::Validation);
    assert_eq!(first.message, "Image exceeds 25 MB");
    assert_eq!(first.details.as_deref(), Some("max_bytes=26214400"));
    assert_eq!(first.request_id.as_deref(), Some("req_big"));
    assert_eq!(first.status, Some(413));
}

#[test]
fn test_missing_credential_fails_at_construction() {
    let err = ClientConfig::builder("\t\n").build().unwrap_err();
    assert!(matches!(err, BgRemovalError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_signature_prefixes() {
    let normalizer = InputNormalizer::new(None);
    let cases: [(&[u8], &str); 6] = [
        (&[0x89, 0x50, 0x4E, 0x47], "image/png"),
        (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
        (b"RIFF\0\0\0\0WEBP", "image/webp"),
        (b"GIF87a", "image/gif"),
        (b"RIFF\0\0\0\0AVI ", "application/octet-stream"),
        (&[0xFF, 0xD8], "application/octet-stream"),
    ];

    for (bytes, content_type) in cases {
        let payload = normalizer
            .normalize(ImageInput::from_bytes(bytes.to_vec()))
            .await
            .unwrap();
        assert_eq!(payload.content_type, content_type, "bytes {:?}", bytes);
        assert_eq!(payload.data.as_ref(), bytes);
    }
}

#[tokio::test]
async fn test_empty_bytes_are_octet_stream() {
    let payload = InputNormalizer::new(None)
        .normalize(ImageInput::from_bytes(Vec::new()))
        .await
        .unwrap();
    assert_eq!(payload.content_type, "application/octet-stream");
    assert_eq!(payload.filename, "image.bin");
    assert!(payload.data.is_empty());
}

#[tokio::test]
async fn test_substituted_filesystem_is_used() {
    let normalizer =
        memory_normalizer(MemoryFileSystem::default().with_file("/virtual/shot.webp", b"whatever"));

    let payload = normalizer
        .normalize(ImageInput::from_path("/virtual/shot.webp"))
        .await
        .unwrap();
    assert_eq!(payload.content_type, "image/webp");
    assert_eq!(payload.filename, "shot.webp");
    assert_eq!(payload.data.as_ref(), b"whatever");
}

#[tokio::test]
async fn test_path_without_file_name_gets_fallback_name() {
    let normalizer = memory_normalizer(
        MemoryFileSystem::default().with_file("/", b"GIF89a\x01\x00\x01\x00\x80\x00"),
    );

    let payload = normalizer.normalize(ImageInput::from_path("/")).await.unwrap();
    assert_eq!(payload.content_type, "image/gif");
    assert_eq!(payload.filename, "image.gif");
}

#[tokio::test]
async fn test_uppercase_extension_is_recognized() {
    let normalizer =
        memory_normalizer(MemoryFileSystem::default().with_file("scan.JPEG", b"not really jpeg"));

    let payload = normalizer.normalize(ImageInput::from_path("scan.JPEG")).await.unwrap();
    assert_eq!(payload.content_type, "image/jpeg");
}

#[tokio::test]
async fn test_memory_filesystem_missing_file() {
    let err = memory_normalizer(MemoryFileSystem::default())
        .normalize(ImageInput::from_path("/virtual/none.png"))
        .await
        .unwrap_err();
    match err {
        BgRemovalError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io error, got {:?}", other),
    }
}
