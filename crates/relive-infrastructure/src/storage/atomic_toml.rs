//! Atomic TOML file storage.
//!
//! Writes go to a sibling temporary file that is synced and renamed over the
//! target, so readers see either the old or the new content. Writers and
//! removals are serialized with an advisory lock file.

use relive_core::ReliveError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Failure of a [`AtomicTomlFile`] operation.
#[derive(Debug)]
pub enum TomlFileError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Encode(toml::ser::Error),
    /// The advisory lock could not be taken.
    Lock(String),
}

impl std::fmt::Display for TomlFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot access file: {}", e),
            Self::Parse(e) => write!(f, "malformed TOML: {}", e),
            Self::Encode(e) => write!(f, "cannot encode TOML: {}", e),
            Self::Lock(e) => write!(f, "cannot lock file: {}", e),
        }
    }
}

impl std::error::Error for TomlFileError {}

impl From<std::io::Error> for TomlFileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for TomlFileError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<toml::ser::Error> for TomlFileError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Encode(e)
    }
}

impl From<TomlFileError> for ReliveError {
    fn from(e: TomlFileError) -> Self {
        let toml_error = |message: String| ReliveError::Serialization {
            format: "TOML".to_string(),
            message,
        };
        match e {
            TomlFileError::Io(io) => ReliveError::from(io),
            TomlFileError::Parse(err) => toml_error(err.to_string()),
            TomlFileError::Encode(err) => toml_error(err.to_string()),
            TomlFileError::Lock(message) => ReliveError::io(message),
        }
    }
}

/// A TOML file holding one value of type `T`.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    private: bool,
    marker: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            private: false,
            marker: PhantomData,
        }
    }

    /// Creates a handle whose file is only readable by the owner (0600 on Unix).
    pub fn private(path: PathBuf) -> Self {
        Self {
            private: true,
            ..Self::new(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: The file holds a value
    /// - `Ok(None)`: The file is missing or blank
    /// - `Err(_)`: The file exists but cannot be read or parsed
    pub fn load(&self) -> Result<Option<T>, TomlFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(toml::from_str(&content)?))
    }

    /// Replaces the file content with `data`.
    pub fn save(&self, data: &T) -> Result<(), TomlFileError> {
        let encoded = toml::to_string_pretty(data)?;
        let _lock = FileLock::acquire(&self.path)?;

        let staged = self.temp_path()?;
        {
            let mut file = self.create_temp(&staged)?;
            file.write_all(encoded.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&staged, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staged);
            TomlFileError::from(e)
        })
    }

    /// Deletes the file. Removing a missing file succeeds.
    pub fn remove(&self) -> Result<(), TomlFileError> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn create_temp(&self, tmp_path: &Path) -> Result<File, TomlFileError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            if self.private {
                options.mode(0o600);
            }
        }

        let file = options.open(tmp_path)?;

        // `mode` only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if self.private {
                file.set_permissions(fs::Permissions::from_mode(0o600))?;
            }
        }

        Ok(file)
    }

    fn temp_path(&self) -> Result<PathBuf, TomlFileError> {
        sibling(&self.path, "tmp")
    }
}

/// `dir/.name.suffix` next to `path`.
fn sibling(path: &Path, suffix: &str) -> Result<PathBuf, TomlFileError> {
    let name = path.file_name().ok_or_else(|| {
        TomlFileError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} does not name a file", path.display()),
        ))
    })?;
    Ok(path.with_file_name(format!(".{}.{}", name.to_string_lossy(), suffix)))
}

/// Exclusive advisory lock held for one write or removal.
///
/// The lock file is deleted again on drop.
struct FileLock {
    path: PathBuf,
    _handle: File,
}

impl FileLock {
    fn acquire(target: &Path) -> Result<Self, TomlFileError> {
        let path = sibling(target, "lock")?;
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        let handle = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            handle
                .lock_exclusive()
                .map_err(|e| TomlFileError::Lock(format!("{}: {}", path.display(), e)))?;
        }

        Ok(Self {
            path,
            _handle: handle,
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
