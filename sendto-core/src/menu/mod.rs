//! Depth-bounded menu construction from a directory tree.
//!
//! [`MenuBuilder::build`] walks the root depth-first in pre-order and
//! produces two things in lock-step: an owned [`MenuTree`] and an
//! [`EntryStore`] holding the path and icon behind every command id.
//!
//! # Failure policy
//!
//! - The root must be listable; failing to open it is fatal.
//! - A subdirectory that cannot be listed contributes no items.
//! - Levels at or beyond the depth bound are pruned without error.
//! - An entry the store refuses is dropped along with its icon.

pub mod node;
pub mod order;

use std::ffi::OsString;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

pub use node::{display_label, snapshot, MenuNode, MenuSnapshot, MenuTree, NodeKind};

use crate::config::{SendToConfig, SortOrder};
use crate::errors::SendToError;
use crate::icon::{EntryKind, IconResolver};
use crate::store::EntryStore;

/// Capacity reserved before the walk starts.  Failing here is fatal.
const INITIAL_CAPACITY: usize = 32;

// ---------------------------------------------------------------------------
// Build result
// ---------------------------------------------------------------------------

/// Menu tree plus the lookup table behind its command ids.
#[derive(Debug)]
pub struct BuiltMenu<I> {
    pub tree: MenuTree,
    pub store: EntryStore<I>,
}

// ---------------------------------------------------------------------------
// Directory scanning
// ---------------------------------------------------------------------------

/// A visible directory entry, ready to become a menu item.
#[derive(Debug)]
struct ScannedEntry {
    name: String,
    path: PathBuf,
    kind: EntryKind,
}

#[cfg(windows)]
fn is_hidden_or_system(_name: &OsString, entry: &DirEntry) -> bool {
    use std::os::windows::fs::MetadataExt;

    let attributes = entry.metadata().map(|meta| meta.file_attributes());
    hidden_by_attributes(&entry.path(), attributes)
}

/// Entries whose attributes cannot be read are treated as hidden.
#[cfg(windows)]
fn hidden_by_attributes(path: &Path, attributes: std::io::Result<u32>) -> bool {
    use windows::Win32::Storage::FileSystem::{FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_SYSTEM};

    match attributes {
        Ok(bits) => bits & (FILE_ATTRIBUTE_HIDDEN.0 | FILE_ATTRIBUTE_SYSTEM.0) != 0,
        Err(e) => {
            log::debug!("skipping {}: attributes unavailable: {e}", path.display());
            true
        }
    }
}

/// Without attribute bits, a leading dot is the hidden marker.
#[cfg(not(windows))]
fn is_hidden_or_system(name: &OsString, _entry: &DirEntry) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_skipped(name: &OsString, entry: &DirEntry) -> bool {
    name == "." || name == ".." || is_hidden_or_system(name, entry)
}

fn entry_kind(entry: &DirEntry) -> Option<EntryKind> {
    let file_type = entry.file_type().ok()?;
    let is_dir = if file_type.is_symlink() {
        fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false)
    } else {
        file_type.is_dir()
    };
    Some(if is_dir {
        EntryKind::Directory
    } else {
        EntryKind::File
    })
}

fn scan_directory(dir: &Path, sort: SortOrder) -> Result<Vec<ScannedEntry>, SendToError> {
    let reader = fs::read_dir(dir).map_err(|source| SendToError::EnumerationError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for item in reader {
        // A failing iterator means the listing itself broke off.
        let entry = item.map_err(|source| SendToError::EnumerationError {
            path: dir.to_path_buf(),
            source,
        })?;

        let name = entry.file_name();
        if is_skipped(&name, &entry) {
            continue;
        }
        let Some(kind) = entry_kind(&entry) else {
            log::debug!("skipping {}: file type unavailable", entry.path().display());
            continue;
        };

        entries.push(ScannedEntry {
            name: name.to_string_lossy().into_owned(),
            path: entry.path(),
            kind,
        });
    }

    if sort == SortOrder::Logical {
        entries.sort_by(|a, b| order::compare_logical(&a.name, &b.name));
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct MenuBuilder<'a, R: IconResolver> {
    icons: &'a R,
    max_depth: usize,
    sort: SortOrder,
}

impl<'a, R: IconResolver> MenuBuilder<'a, R> {
    pub fn new(icons: &'a R, config: &SendToConfig) -> Self {
        Self {
            icons,
            max_depth: config.max_depth,
            sort: config.sort,
        }
    }

    /// Walk `root` and build the menu.
    ///
    /// Returns [`SendToError::EmptyMenu`] when nothing visible was found.
    pub fn build(&self, root: &Path) -> Result<BuiltMenu<R::Icon>, SendToError> {
        self.build_into(root, EntryStore::new())
    }

    /// Like [`build`](Self::build), filling a caller-supplied empty store.
    pub fn build_into(
        &self,
        root: &Path,
        mut store: EntryStore<R::Icon>,
    ) -> Result<BuiltMenu<R::Icon>, SendToError> {
        store.ensure_capacity(INITIAL_CAPACITY)?;

        let items = self.enumerate(root, 0, &mut store)?;
        if store.is_empty() {
            return Err(SendToError::EmptyMenu(root.to_path_buf()));
        }

        log::debug!(
            "built menu from {}: {} entries",
            root.display(),
            store.len()
        );
        Ok(BuiltMenu {
            tree: MenuTree { items },
            store,
        })
    }

    fn enumerate(
        &self,
        dir: &Path,
        depth: usize,
        store: &mut EntryStore<R::Icon>,
    ) -> Result<Vec<MenuNode>, SendToError> {
        if depth >= self.max_depth {
            return Ok(Vec::new());
        }
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = scan_directory(dir, self.sort)?;
        let mut nodes = Vec::with_capacity(entries.len());

        for entry in entries {
            let icon = self.icons.resolve_icon(&entry.path, entry.kind);
            if icon.is_none() {
                log::debug!("no icon for {}", entry.path.display());
            }

            let id = match store.push(entry.path.clone(), icon) {
                Ok(id) => id,
                Err(rejected) => {
                    log::warn!(
                        "dropping {}: {}",
                        rejected.path.display(),
                        rejected.reason
                    );
                    continue;
                }
            };

            match entry.kind {
                EntryKind::Directory => {
                    let children = match self.enumerate(&entry.path, depth + 1, store) {
                        Ok(children) => children,
                        Err(e) => {
                            log::warn!("pruning {}: {e}", entry.path.display());
                            Vec::new()
                        }
                    };
                    nodes.push(MenuNode::submenu(id, entry.name, children));
                }
                EntryKind::File => {
                    nodes.push(MenuNode::target(id, display_label(&entry.name)));
                }
            }
        }

        Ok(nodes)
    }
}
