use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempPath;

/// A locally viewable copy of an asset payload.
///
/// The preview is a temporary file that is deleted when the last handle is
/// dropped. Handles are cheap to clone.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    path: Arc<TempPath>,
}

impl PreviewHandle {
    /// Writes `data` to a new temporary file with the given extension.
    pub fn create(data: &[u8], extension: &str) -> std::io::Result<Self> {
        let suffix = if extension.is_empty() {
            String::new()
        } else {
            format!(".{}", extension.trim_start_matches('.'))
        };
        let mut file = tempfile::Builder::new()
            .prefix("relive-preview-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;

        Ok(Self {
            path: Arc::new(file.into_temp_path()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartialEq for PreviewHandle {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_removed_after_last_handle() {
        let handle = PreviewHandle::create(b"voice", "webm").unwrap();
        let path = handle.path().to_path_buf();
        assert_eq!(path.extension().unwrap(), "webm");
        assert_eq!(std::fs::read(&path).unwrap(), b"voice");

        let copy = handle.clone();
        drop(handle);
        assert!(path.exists());

        drop(copy);
        assert!(!path.exists());
    }
}
