//! Entry store: the command id -> (path, icon) lookup table.
//!
//! [`EntryStore`] is the single source of truth for "what does selecting
//! command N mean".  Command ids are 1-based positions in the store and are
//! never reused within a run.  Icons are owned by the store; dropping an
//! entry releases its icon through the icon type's own `Drop`.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::SendToError;

/// Smallest capacity allocated on first growth.
pub const MIN_CAPACITY: usize = 16;

/// Dense, 1-based menu command identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CommandId(NonZeroU32);

impl CommandId {
    /// `None` for the native "no selection" sentinel `0`.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Id of the entry stored at `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        let raw = u32::try_from(index).ok()?.checked_add(1)?;
        Self::new(raw)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One discoverable target reachable from the root.
#[derive(Debug)]
pub struct MenuEntry<I> {
    path: PathBuf,
    icon: Option<I>,
}

impl<I> MenuEntry<I> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn icon(&self) -> Option<&I> {
        self.icon.as_ref()
    }
}

/// A push the store could not accept.  Ownership of both resources goes
/// back to the caller.
#[derive(Debug)]
pub struct Rejected<I> {
    pub path: PathBuf,
    pub icon: Option<I>,
    pub reason: SendToError,
}

#[derive(Debug)]
pub struct EntryStore<I> {
    entries: Vec<MenuEntry<I>>,
    limit: Option<usize>,
}

impl<I> Default for EntryStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> EntryStore<I> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            limit: None,
        }
    }

    /// A store that refuses pushes once it holds `limit` entries.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Grow the backing storage to hold at least `need` entries.
    ///
    /// Growth doubles the current capacity (starting at [`MIN_CAPACITY`]) and
    /// never shrinks.  Fails only when the allocator refuses.
    pub fn ensure_capacity(&mut self, need: usize) -> Result<(), SendToError> {
        let capacity = self.entries.capacity();
        if need <= capacity {
            return Ok(());
        }

        let target = need
            .max(capacity.saturating_mul(2))
            .max(MIN_CAPACITY);
        self.entries
            .try_reserve_exact(target - self.entries.len())
            .map_err(|e| {
                SendToError::OutOfMemory(format!("entry store growth to {target} failed: {e}"))
            })
    }

    /// Append an entry and return its command id.
    ///
    /// All-or-nothing: on failure the store is unchanged and the path and
    /// icon come back inside [`Rejected`].
    pub fn push(&mut self, path: PathBuf, icon: Option<I>) -> Result<CommandId, Rejected<I>> {
        let Some(id) = CommandId::from_index(self.entries.len()) else {
            return Err(Rejected {
                path,
                icon,
                reason: SendToError::OutOfMemory("command id space exhausted".into()),
            });
        };

        if self.limit.is_some_and(|limit| self.entries.len() >= limit) {
            return Err(Rejected {
                path,
                icon,
                reason: SendToError::OutOfMemory(format!(
                    "entry store is full at {} entries",
                    self.entries.len()
                )),
            });
        }

        if let Err(reason) = self.ensure_capacity(self.entries.len() + 1) {
            return Err(Rejected { path, icon, reason });
        }

        self.entries.push(MenuEntry { path, icon });
        Ok(id)
    }

    pub fn get(&self, id: CommandId) -> Option<&MenuEntry<I>> {
        self.entries.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Entries in command id order, paired with their id.
    pub fn iter(&self) -> impl Iterator<Item = (CommandId, &MenuEntry<I>)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| CommandId::from_index(index).map(|id| (id, entry)))
    }

    /// Release every icon and path and reset to empty.  Safe to call twice.
    pub fn destroy(&mut self) {
        self.entries = Vec::new();
    }
}
