use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::preview::PreviewHandle;

/// Identifier of an asset.
///
/// Locally created assets get a random id. Existing remote assets are keyed by
/// kind and server id, since images, videos and recordings are numbered
/// independently on the server.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Id of an asset already stored on the server, e.g. `audio:7`.
    pub fn remote(kind: AssetKind, server_id: u64) -> Self {
        Self(format!("{}:{}", kind, server_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
}

impl AssetKind {
    /// Upload order used by the orchestrator.
    pub const UPLOAD_ORDER: [AssetKind; 3] = [Self::Image, Self::Video, Self::Audio];

    /// Multipart field carrying the file.
    pub fn upload_field(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Collection segment under `/memories/{id}/`.
    pub fn collection_segment(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
            Self::Audio => "recordings",
        }
    }

    /// Top-level resource used to delete a single asset.
    pub fn resource_segment(self) -> &'static str {
        match self {
            Self::Image => "memory-images",
            Self::Video => "memory-videos",
            Self::Audio => "memory-recordings",
        }
    }

    /// Infers the kind from a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.split('/').next()? {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.upload_field())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetOrigin {
    FileSelection,
    Recording,
    ExistingRemote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Pending,
    Uploading,
    Succeeded,
    Failed,
}

/// Who is speaking in a voice recording.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    pub relation: String,
}

/// An image, video, or audio item attached (or to be attached) to a memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub id: AssetId,
    pub kind: AssetKind,
    pub origin: AssetOrigin,
    pub file_name: String,
    pub mime_type: String,
    /// Raw bytes; empty for existing remote assets.
    pub payload: Bytes,
    /// Local preview; dropping the asset releases it.
    pub preview: Option<PreviewHandle>,
    pub upload_status: UploadStatus,
    pub caption: Option<String>,
    pub speaker: Option<Speaker>,
    /// Server URL for existing remote assets
    pub remote_url: Option<String>,
    /// Server id within the kind's collection, for existing remote assets
    pub server_id: Option<u64>,
}

impl MediaAsset {
    /// Creates a new local asset waiting to be uploaded.
    pub fn local(
        kind: AssetKind,
        origin: AssetOrigin,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        payload: Bytes,
    ) -> Self {
        Self {
            id: AssetId::generate(),
            kind,
            origin,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            payload,
            preview: None,
            upload_status: UploadStatus::Pending,
            caption: None,
            speaker: None,
            remote_url: None,
            server_id: None,
        }
    }

    /// Describes an asset that already exists on the server.
    pub fn existing(server_id: u64, kind: AssetKind, url: impl Into<String>) -> Self {
        let url = url.into();
        let file_name = url.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            id: AssetId::remote(kind, server_id),
            kind,
            origin: AssetOrigin::ExistingRemote,
            file_name,
            mime_type: String::new(),
            payload: Bytes::new(),
            preview: None,
            upload_status: UploadStatus::Succeeded,
            caption: None,
            speaker: None,
            remote_url: Some(url),
            server_id: Some(server_id),
        }
    }

    pub fn with_preview(mut self, preview: PreviewHandle) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_speaker(mut self, name: impl Into<String>, relation: impl Into<String>) -> Self {
        self.speaker = Some(Speaker {
            name: name.into(),
            relation: relation.into(),
        });
        self
    }

    /// Whether the orchestrator still has to send this asset.
    pub fn needs_upload(&self) -> bool {
        self.origin != AssetOrigin::ExistingRemote && self.upload_status != UploadStatus::Succeeded
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_routes() {
        assert_eq!(AssetKind::Audio.upload_field(), "audio");
        assert_eq!(AssetKind::Audio.collection_segment(), "recordings");
        assert_eq!(AssetKind::Video.resource_segment(), "memory-videos");
        assert_eq!(AssetKind::from_mime("image/png"), Some(AssetKind::Image));
        assert_eq!(AssetKind::from_mime("application/pdf"), None);
    }

    #[test]
    fn test_needs_upload() {
        let mut asset = MediaAsset::local(
            AssetKind::Image,
            AssetOrigin::FileSelection,
            "a.jpg",
            "image/jpeg",
            Bytes::from_static(b"x"),
        );
        assert!(asset.needs_upload());

        asset.upload_status = UploadStatus::Failed;
        assert!(asset.needs_upload());

        asset.upload_status = UploadStatus::Succeeded;
        assert!(!asset.needs_upload());

        let remote = MediaAsset::existing(12, AssetKind::Video, "http://h/media/v.mp4");
        assert!(!remote.needs_upload());
        assert_eq!(remote.file_name, "v.mp4");
        assert_eq!(remote.id, AssetId::from("video:12"));
        assert_eq!(remote.server_id, Some(12));
    }

    #[test]
    fn test_remote_ids_differ_across_kinds() {
        let image = MediaAsset::existing(7, AssetKind::Image, "u");
        let audio = MediaAsset::existing(7, AssetKind::Audio, "u");
        assert_ne!(image.id, audio.id);
    }
}
