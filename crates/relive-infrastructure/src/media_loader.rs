//! Loads local media files as uploadable assets.

use bytes::Bytes;
use relive_core::media::{AssetKind, AssetOrigin, MediaAsset, PreviewHandle};
use relive_core::{ReliveError, Result};
use std::path::Path;

/// MIME type sent for a picked file; unknown extensions become `application/octet-stream`.
fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Turns files picked by the user into [`MediaAsset`]s.
#[derive(Debug, Clone, Default)]
pub struct MediaFileLoader {
    with_preview: bool,
}

impl MediaFileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also writes a local preview copy for every loaded asset.
    pub fn with_preview(mut self) -> Self {
        self.with_preview = true;
        self
    }

    /// Reads `path` and classifies it as image, video, or audio.
    ///
    /// Files of any other type are rejected with `InvalidDraft`.
    pub async fn load(&self, path: &Path) -> Result<MediaAsset> {
        let mime_type = infer_mime_type(path);
        let kind = AssetKind::from_mime(&mime_type).ok_or_else(|| {
            ReliveError::InvalidDraft(format!(
                "{} is not an image, video, or audio file ({})",
                path.display(),
                mime_type
            ))
        })?;

        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("upload.{}", kind));

        tracing::debug!(
            "[MediaLoader] Loaded {} ({} bytes, {})",
            file_name,
            data.len(),
            mime_type
        );

        let mut asset = MediaAsset::local(
            kind,
            AssetOrigin::FileSelection,
            file_name,
            mime_type,
            Bytes::from(data),
        );

        if self.with_preview {
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            let preview = PreviewHandle::create(&asset.payload, &extension)?;
            asset = asset.with_preview(preview);
        }

        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_classifies_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let image = temp_dir.path().join("beach.png");
        let audio = temp_dir.path().join("note.mp3");
        std::fs::write(&image, b"png").unwrap();
        std::fs::write(&audio, b"mp3").unwrap();

        let loader = MediaFileLoader::new();
        let asset = loader.load(&image).await.unwrap();
        assert_eq!(asset.kind, AssetKind::Image);
        assert_eq!(asset.mime_type, "image/png");
        assert_eq!(asset.file_name, "beach.png");
        assert_eq!(asset.origin, AssetOrigin::FileSelection);
        assert!(asset.preview.is_none());

        let asset = loader.load(&audio).await.unwrap();
        assert_eq!(asset.kind, AssetKind::Audio);
    }

    #[tokio::test]
    async fn test_load_with_preview() {
        let temp_dir = TempDir::new().unwrap();
        let video = temp_dir.path().join("clip.mp4");
        std::fs::write(&video, b"mp4").unwrap();

        let asset = MediaFileLoader::new().with_preview().load(&video).await.unwrap();
        let preview = asset.preview.as_ref().unwrap();
        assert_eq!(std::fs::read(preview.path()).unwrap(), b"mp4");
    }

    #[tokio::test]
    async fn test_rejects_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("notes.txt");
        std::fs::write(&doc, b"text").unwrap();

        let err = MediaFileLoader::new().load(&doc).await.unwrap_err();
        assert!(matches!(err, ReliveError::InvalidDraft(_)));
    }
}
