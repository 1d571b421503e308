//! `sendto_core` -- menu construction and dispatch engine for SendTo+.
//!
//! Given a root directory, the engine builds a nested popup menu of its
//! contents and, once the user picks an entry, either opens it or
//! simulates dropping a list of files onto it.  All operating-system work
//! goes through three traits so the engine itself runs (and is tested)
//! anywhere; [`win32::ShellContext`] is the real implementation.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `SendToError` enum via `thiserror` |
//! | [`config`] | Root resolution, depth bound, ordering policy |
//! | [`store`] | `EntryStore`: command id -> (path, icon) |
//! | [`icon`] | `IconResolver` contract and fallback plan |
//! | [`menu`] | Depth-bounded `MenuBuilder` and the owned `MenuTree` |
//! | [`host`] | `SelectionHost` contract: render and track a menu |
//! | [`dispatch`] | Open or drag-and-drop onto the chosen entry |
//! | [`session`] | One invocation end to end |
//! | `win32` | Shell context, OLE guard, native menu (Windows only) |

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod host;
pub mod icon;
pub mod menu;
pub mod session;
pub mod store;

#[cfg(windows)]
pub mod win32;
