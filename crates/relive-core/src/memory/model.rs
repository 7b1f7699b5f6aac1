use serde::{Deserialize, Serialize};

use crate::media::{AssetKind, MediaAsset};

/// Server-side identifier of a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(pub u64);

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scalar fields sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tag: String,
}

/// A memory as returned by the list and create/update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: MemoryId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub resolved_image_url: Option<String>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One image, video, or recording listed in a memory detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMedia {
    pub id: u64,
    #[serde(
        default,
        alias = "resolved_image_url",
        alias = "resolved_video_url",
        alias = "resolved_audio_url"
    )]
    pub url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub speaker_name: Option<String>,
    #[serde(default)]
    pub speaker_relation: Option<String>,
}

impl RemoteMedia {
    fn into_asset(self, kind: AssetKind) -> MediaAsset {
        let mut asset = MediaAsset::existing(self.id, kind, self.url.unwrap_or_default());
        asset.caption = self.caption.filter(|c| !c.is_empty());
        if let Some(name) = self.speaker_name.filter(|n| !n.is_empty()) {
            asset = asset.with_speaker(name, self.speaker_relation.unwrap_or_default());
        }
        asset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaCounts {
    #[serde(default)]
    pub images: u32,
    #[serde(default)]
    pub videos: u32,
    #[serde(default)]
    pub voice_recordings: u32,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
}

/// A memory with all of its media, as shown on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDetail {
    pub id: MemoryId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub resolved_image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<RemoteMedia>,
    #[serde(default)]
    pub videos: Vec<RemoteMedia>,
    #[serde(default)]
    pub voice_recordings: Vec<RemoteMedia>,
    #[serde(default)]
    pub media_counts: MediaCounts,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub can_edit: bool,
}

impl MemoryDetail {
    pub fn fields(&self) -> MemoryFields {
        MemoryFields {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            date: self.date.clone(),
            location: self.location.clone().unwrap_or_default(),
            tag: self.tag.clone().unwrap_or_default(),
        }
    }

    pub fn likes_count(&self) -> u32 {
        self.media_counts.likes
    }

    /// Converts the listed media into existing-remote assets, images first.
    pub fn existing_assets(&self) -> Vec<MediaAsset> {
        let images = self
            .images
            .iter()
            .cloned()
            .map(|m| m.into_asset(AssetKind::Image));
        let videos = self
            .videos
            .iter()
            .cloned()
            .map(|m| m.into_asset(AssetKind::Video));
        let recordings = self
            .voice_recordings
            .iter()
            .cloned()
            .map(|m| m.into_asset(AssetKind::Audio));
        images.chain(videos).chain(recordings).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub id: MemoryId,
    pub title: String,
    pub date: String,
}

/// Neighbours of a memory in the owner's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryNavigation {
    #[serde(default)]
    pub previous_memory: Option<NavigationEntry>,
    #[serde(default)]
    pub next_memory: Option<NavigationEntry>,
    pub current_position: u32,
    pub total_memories: u32,
}
