//! Run configuration: root directory, depth bound and ordering policy.
//!
//! The tool keeps no configuration file.  The CLI builds a [`SendToConfig`]
//! from its arguments; the engine only ever sees a validated value.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::SendToError;

/// Name of the directory looked up next to the executable.
pub const SENDTO_DIR_NAME: &str = "sendto";

/// Default number of menu levels (root included).
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Upper bound accepted for `--max-depth`.
pub const MAX_DEPTH_LIMIT: usize = 16;

/// Presentation order of entries within one menu level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Whatever order the filesystem hands entries back in.
    #[default]
    Enumeration,
    /// Explorer-style natural order (`file2` before `file10`).
    Logical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendToConfig {
    pub root: PathBuf,
    pub max_depth: usize,
    pub sort: SortOrder,
}

impl SendToConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            sort: SortOrder::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Check the depth bound and that the root is an existing directory.
    pub fn validate(&self) -> Result<(), SendToError> {
        if !(1..=MAX_DEPTH_LIMIT).contains(&self.max_depth) {
            return Err(SendToError::ConfigError(format!(
                "max depth {} out of range 1..={MAX_DEPTH_LIMIT}",
                self.max_depth
            )));
        }
        validate_root(&self.root)
    }
}

/// `<directory containing exe>/sendto`.
pub fn default_root(exe: &Path) -> Result<PathBuf, SendToError> {
    let dir = exe.parent().ok_or_else(|| {
        SendToError::ConfigError(format!(
            "cannot determine the directory of {}",
            exe.display()
        ))
    })?;
    Ok(dir.join(SENDTO_DIR_NAME))
}

/// Pick the override when given, otherwise the folder next to `exe`.
pub fn resolve_root(dir_override: Option<&Path>, exe: &Path) -> Result<PathBuf, SendToError> {
    match dir_override {
        Some(dir) if dir.as_os_str().is_empty() => Err(SendToError::ConfigError(
            "directory override is empty".into(),
        )),
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_root(exe),
    }
}

/// The root must exist and be a directory.
pub fn validate_root(root: &Path) -> Result<(), SendToError> {
    if !root.exists() {
        return Err(SendToError::ConfigError(format!(
            "cannot find '{}'",
            root.display()
        )));
    }
    if !root.is_dir() {
        return Err(SendToError::ConfigError(format!(
            "'{}' is not a directory",
            root.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_root_is_next_to_executable() {
        let exe = Path::new("tools").join("sendto.exe");
        let root = default_root(&exe).unwrap();
        assert_eq!(root, Path::new("tools").join("sendto"));
    }

    #[test]
    fn test_override_wins() {
        let exe = Path::new("tools").join("sendto.exe");
        let root = resolve_root(Some(Path::new("elsewhere")), &exe).unwrap();
        assert_eq!(root, PathBuf::from("elsewhere"));
    }

    #[test]
    fn test_empty_override_rejected() {
        let exe = Path::new("tools").join("sendto.exe");
        let err = resolve_root(Some(Path::new("")), &exe).unwrap_err();
        assert!(matches!(err, SendToError::ConfigError(_)));
    }

    #[test]
    fn test_validate_missing_root() {
        let dir = tempdir().unwrap();
        let err = validate_root(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("cannot find"));
    }

    #[test]
    fn test_validate_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let err = validate_root(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_validate_depth_bounds() {
        let dir = tempdir().unwrap();
        let config = SendToConfig::new(dir.path());
        assert!(config.validate().is_ok());
        assert!(config.clone().with_max_depth(0).validate().is_err());
        assert!(config
            .clone()
            .with_max_depth(MAX_DEPTH_LIMIT + 1)
            .validate()
            .is_err());
        assert!(config.with_max_depth(MAX_DEPTH_LIMIT).validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = SendToConfig::new("root");
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.sort, SortOrder::Enumeration);
    }
}
