//! Selection host contract: render a built menu and let the user pick.

use crate::errors::SendToError;
use crate::menu::MenuTree;
use crate::store::{CommandId, EntryStore};

/// Turns a [`MenuTree`] into a native popup and tracks it.
///
/// `Menu` owns the native menu; dropping it destroys the menu.  Rendering
/// borrows icons out of the store, so the store must outlive the menu.
pub trait SelectionHost {
    type Icon;
    type Menu;

    fn render(&self, tree: &MenuTree, store: &EntryStore<Self::Icon>)
        -> Result<Self::Menu, SendToError>;

    /// Show `menu` at the cursor and block until dismissed.
    ///
    /// `Ok(None)` means the user made no selection.
    fn show_and_select(&self, menu: &Self::Menu) -> Result<Option<CommandId>, SendToError>;
}
