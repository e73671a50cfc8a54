//! Subcommand implementations.

pub mod cleanup;
pub mod config;
pub mod get;
pub mod inspect;
pub mod list;
pub mod process;

use std::path::Path;

use pixnorm_core::{RawUpload, TARGET_SIZE};

/// Read a file from disk as an upload.
///
/// Files already known to exceed `max_bytes` are not read; the declared
/// size alone is enough for the validator to reject them.
pub(crate) async fn read_upload(path: &Path, size: u64, max_bytes: u64) -> anyhow::Result<RawUpload> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if size > max_bytes {
        tracing::debug!("Skipping read of {:?} ({} bytes)", path, size);
        let mut upload = RawUpload::new(Vec::new(), file_name);
        upload.declared_size = size;
        return Ok(upload);
    }

    let bytes = tokio::fs::read(path).await?;
    Ok(RawUpload::new(bytes, file_name))
}

/// Banner shown by `process` for batch runs.
pub(crate) fn describe_target() -> String {
    format!("{TARGET_SIZE}x{TARGET_SIZE} grayscale JPEG")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_upload_small_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"abc").unwrap();

        let upload = read_upload(&path, 3, 1024).await.unwrap();
        assert_eq!(upload.file_name, "photo.png");
        assert_eq!(upload.bytes, b"abc");
        assert_eq!(upload.declared_size, 3);
    }

    #[tokio::test]
    async fn test_read_upload_oversize_is_not_read() {
        let upload = read_upload(Path::new("/nonexistent/big.jpg"), 2048, 1024)
            .await
            .unwrap();
        assert!(upload.bytes.is_empty());
        assert_eq!(upload.declared_size, 2048);
        assert_eq!(upload.file_name, "big.jpg");
    }

    #[test]
    fn test_describe_target() {
        assert_eq!(describe_target(), "300x300 grayscale JPEG");
    }
}
