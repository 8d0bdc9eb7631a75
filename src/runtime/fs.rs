use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    /// Writes next to the target first, then renames over it, so readers
    /// never see a half-written collection.
    #[tracing::instrument(skip(self, contents))]
    pub(crate) fn write_impl(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let staging = staging_path(path);
        fs::write(&staging, contents)
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        fs::rename(&staging, path)
            .with_context(|| format!("Failed to replace {}", path.display()))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub(crate) fn create_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))
    }

    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.try_exists().unwrap_or(false)
    }

    pub(crate) fn read_stdin_impl(&self) -> Result<String> {
        let mut input = String::new();
        std::io::stdin().lock().read_to_string(&mut input)?;
        Ok(input)
    }
}

/// `alerts.json` -> `alerts.json.tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn test_write_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        let file = root.join("cryptotracker_alerts.json");

        RealRuntime.create_dir_all(&root).unwrap();
        assert!(RealRuntime.exists(&root));
        assert!(!RealRuntime.exists(&file));

        RealRuntime.write(&file, b"[1, 2, 3]").unwrap();
        RealRuntime.write(&file, b"[]").unwrap();

        assert_eq!(RealRuntime.read_to_string(&file).unwrap(), "[]");
        assert!(!RealRuntime.exists(&staging_path(&file)));
    }

    #[test]
    fn test_read_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let err = RealRuntime.read_to_string(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("/data/cryptotracker_portfolio.json")),
            PathBuf::from("/data/cryptotracker_portfolio.json.tmp")
        );
    }
}
