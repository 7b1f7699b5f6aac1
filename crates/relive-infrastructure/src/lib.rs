//! Infrastructure adapters for the ReLive client: file-backed session storage,
//! configuration loading, and local media files.

pub mod config_service;
pub mod file_session_store;
pub mod media_loader;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_session_store::FileSessionStore;
pub use crate::media_loader::MediaFileLoader;
pub use crate::paths::RelivePaths;
