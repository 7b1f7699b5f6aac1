//! Media assets attached to memories.

mod model;
mod preview;

pub use model::{AssetId, AssetKind, AssetOrigin, MediaAsset, Speaker, UploadStatus};
pub use preview::PreviewHandle;
