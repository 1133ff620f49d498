//! Locates the directories weight files are cached in.
use std::path::{Path, PathBuf};
use crate::error::DetectError;

/// Base directories the weight cache may live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsAccess {
    Current,
    Cache,
}

impl FsAccess {
    /// Returns the base path for the directory type without creating anything.
    ///
    /// Examples:
    /// the process working directory, `~/.cache`.
    pub fn raw_path(&self) -> Result<PathBuf, DetectError> {
        let base_path = match self {
            FsAccess::Current => std::env::current_dir().ok(),
            FsAccess::Cache => dirs::cache_dir(),
        };

        base_path.ok_or_else(|| {
            DetectError::Config(format!("cannot resolve the {:?} directory on this system", self))
        })
    }

    /// Where weights are cached unless configured otherwise.
    ///
    /// `./data/__vision/weights` under the working directory, falling back to
    /// `<user cache>/rcnn/weights` when the working directory is unavailable.
    pub fn weights_dir() -> Result<PathBuf, DetectError> {
        match FsAccess::Current.raw_path() {
            Ok(d) => Ok(d.join("data").join("__vision").join("weights")),
            Err(err) => {
                log::debug!("{}, using the user cache directory", err);
                Ok(FsAccess::Cache.raw_path()?.join("rcnn").join("weights"))
            }
        }
    }

    /// Creates the specified directory if it does not exist.
    pub fn ensure_dir(path: &Path) -> Result<(), DetectError> {
        if !path.exists() {
            log::debug!("Creating directory {}", path.display());
            std::fs::create_dir_all(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("data").join("__vision").join("weights");
        FsAccess::ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // second call is a no-op
        FsAccess::ensure_dir(&nested).unwrap();
    }

    #[test]
    fn weights_dir_lives_under_the_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            FsAccess::weights_dir().unwrap(),
            cwd.join("data").join("__vision").join("weights")
        );
    }

    #[test]
    fn cache_base_comes_from_the_platform() {
        match dirs::cache_dir() {
            Some(d) => assert_eq!(FsAccess::Cache.raw_path().unwrap(), d),
            None => assert!(matches!(FsAccess::Cache.raw_path(), Err(DetectError::Config(_)))),
        }
    }
}
