//! Icon resolution contract and fallback plan.
//!
//! A resolver maps a path to a small top-down 32-bit ARGB bitmap, or to
//! nothing.  Which lookups are attempted, and in which order, is decided
//! here by [`icon_plan`]; executing a lookup is the resolver's business
//! (see `win32::icon` for the shell-backed one).

use std::path::Path;

/// Extensions that get the shortcut arrow overlay (compared without case).
pub const SHORTCUT_EXTENSIONS: &[&str] = &["lnk"];

/// What kind of filesystem entry an icon is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One lookup attempt in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconTier {
    /// Ask the shell for the small icon of the real path.
    Shell { link_overlay: bool },
    /// Look up by attributes only and draw from the shared small-icon list.
    SystemList,
}

/// Maps a path to an owned icon.
///
/// `Icon` owns the native bitmap; dropping it releases the bitmap.  A miss
/// is not an error: the entry simply renders without an icon.
pub trait IconResolver {
    type Icon;

    fn resolve_icon(&self, path: &Path, kind: EntryKind) -> Option<Self::Icon>;
}

/// Resolver that never produces an icon.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconResolver for NoIcons {
    type Icon = ();

    fn resolve_icon(&self, _path: &Path, _kind: EntryKind) -> Option<()> {
        None
    }
}

/// Whether `path` carries a shortcut extension.
pub fn is_shortcut(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SHORTCUT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Lookups to try for `path`, first hit wins.
///
/// Directories only get the direct shell icon; files fall back to the
/// shared system list, which also works for virtual or missing paths.
pub fn icon_plan(path: &Path, kind: EntryKind) -> Vec<IconTier> {
    match kind {
        EntryKind::Directory => vec![IconTier::Shell {
            link_overlay: false,
        }],
        EntryKind::File => vec![
            IconTier::Shell {
                link_overlay: is_shortcut(path),
            },
            IconTier::SystemList,
        ],
    }
}
