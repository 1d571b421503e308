//! Error types for `sendto_core`.
//!
//! All failures are funnelled through [`SendToError`], which uses
//! `thiserror` for `Display` and `Error` derives.  Only a subset of the
//! variants ever reaches the user (see [`SendToError::is_user_visible`]);
//! the rest degrade a single feature and end up in the log.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the `sendto_core` library.
///
/// Each variant corresponds to a distinct failure category.
#[derive(Debug, Error)]
pub enum SendToError {
    /// Root directory missing, not a directory, or a malformed option.
    #[error("ConfigError: {0}")]
    ConfigError(String),

    /// A directory could not be opened or listed.
    #[error("EnumerationError: {}: {source}", path.display())]
    EnumerationError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The walk finished without a single visible entry.
    #[error("EmptyMenu: nothing to show under {}", .0.display())]
    EmptyMenu(PathBuf),

    /// Allocation failure while growing the entry store.
    #[error("OutOfMemory: {0}")]
    OutOfMemory(String),

    /// OLE / COM / Win32 failure.
    #[error("ComError: {0}")]
    ComError(String),

    /// A path could not be turned into a shell item identifier.
    #[error("ResolveError: {0}")]
    ResolveError(String),

    /// Native menu creation or tracking failure.
    #[error("MenuError: {0}")]
    MenuError(String),

    /// Opening or dropping onto the chosen target failed.
    #[error("DispatchError: {0}")]
    DispatchError(String),
}

impl SendToError {
    /// Root-level failures that are reported to the user rather than only
    /// logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            SendToError::ConfigError(_)
                | SendToError::EnumerationError { .. }
                | SendToError::EmptyMenu(_)
        )
    }
}

/// Convert a `windows::core::Error` (COM / Win32 HRESULT failure) into a
/// `SendToError::ComError`.
#[cfg(windows)]
impl From<windows::core::Error> for SendToError {
    fn from(err: windows::core::Error) -> Self {
        SendToError::ComError(format!("Windows COM error: {err}"))
    }
}
