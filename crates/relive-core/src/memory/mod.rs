//! Memory domain: remote records, the editable draft, upload reports, and the feed.

mod draft;
mod feed;
mod model;
mod report;

pub use draft::DraftMemory;
pub use feed::MemoryFeed;
pub use model::{
    MediaCounts, MemoryDetail, MemoryFields, MemoryId, MemoryNavigation, MemoryRecord,
    NavigationEntry, RemoteMedia,
};
pub use report::{AssetOutcome, UploadReport};
