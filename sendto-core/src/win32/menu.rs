//! Native popup menu rendering and tracking.
//!
//! The popup is owned by a hidden `WS_POPUP` window that is brought to the
//! foreground first; without that, the menu would not close when the user
//! clicks elsewhere.

use std::mem::{size_of, ManuallyDrop};

use windows::core::{w, Error, PCWSTR, PWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, TRUE, WPARAM};
use windows::Win32::Graphics::Gdi::HBITMAP;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow, GetCursorPos,
    InsertMenuItemW, PostMessageW, RegisterClassExW, SetForegroundWindow, SetMenuInfo,
    TrackPopupMenuEx, UnregisterClassW, HMENU, MENUINFO, MENUITEMINFOW, MIIM_BITMAP, MIIM_ID,
    MIIM_STRING, MIIM_SUBMENU, MIM_HELPID, TPM_LEFTALIGN, TPM_LEFTBUTTON, TPM_NONOTIFY,
    TPM_RETURNCMD, WINDOW_EX_STYLE, WM_NULL, WNDCLASSEXW, WS_POPUP,
};

use super::{icon::Bitmap, wide_str, ShellContext};
use crate::errors::SendToError;
use crate::host::SelectionHost;
use crate::menu::{MenuNode, MenuTree, NodeKind};
use crate::store::{CommandId, EntryStore};

const OWNER_CLASS: PCWSTR = w!("SendToOwnerWindow");

// ---------------------------------------------------------------------------
// Owner window
// ---------------------------------------------------------------------------

extern "system" fn owner_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

pub(super) struct OwnerWindow {
    hwnd: HWND,
    instance: HINSTANCE,
    registered: bool,
}

impl OwnerWindow {
    pub(super) fn create() -> Result<Self, SendToError> {
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }?;
        let instance = HINSTANCE(module.0);

        let class = WNDCLASSEXW {
            cbSize: size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(owner_proc),
            hInstance: instance,
            lpszClassName: OWNER_CLASS,
            ..Default::default()
        };
        // A second context in the same process finds the class registered.
        let registered = unsafe { RegisterClassExW(&class) } != 0;
        if !registered {
            log::debug!("RegisterClassExW: {}", Error::from_win32());
        }

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                OWNER_CLASS,
                PCWSTR::null(),
                WS_POPUP,
                0,
                0,
                0,
                0,
                HWND::default(),
                HMENU::default(),
                instance,
                None,
            )
        };
        let hwnd = match hwnd {
            Ok(hwnd) => hwnd,
            Err(e) => {
                if registered {
                    unsafe {
                        let _ = UnregisterClassW(OWNER_CLASS, instance);
                    }
                }
                return Err(SendToError::MenuError(format!("CreateWindowExW failed: {e}")));
            }
        };

        let _ = unsafe { SetForegroundWindow(hwnd) };
        Ok(Self {
            hwnd,
            instance,
            registered,
        })
    }

    pub(super) fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

impl Drop for OwnerWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
            if self.registered {
                let _ = UnregisterClassW(OWNER_CLASS, self.instance);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Menu handle
// ---------------------------------------------------------------------------

/// A popup menu, destroyed (with all attached submenus) on drop.
#[derive(Debug)]
pub struct NativeMenu(HMENU);

impl NativeMenu {
    fn create() -> Result<Self, SendToError> {
        let menu = unsafe { CreatePopupMenu() }
            .map_err(|e| SendToError::MenuError(format!("CreatePopupMenu failed: {e}")))?;
        Ok(Self(menu))
    }

    pub fn handle(&self) -> HMENU {
        self.0
    }

    /// Give up ownership; used once a submenu is attached to its parent.
    fn into_raw(self) -> HMENU {
        ManuallyDrop::new(self).0
    }
}

impl Drop for NativeMenu {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyMenu(self.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn insert_item(menu: &NativeMenu, position: usize, item: &MENUITEMINFOW) -> Result<(), SendToError> {
    unsafe { InsertMenuItemW(menu.handle(), position as u32, TRUE, item) }
        .map_err(|e| SendToError::MenuError(format!("InsertMenuItemW failed: {e}")))
}

/// Tag a submenu with the command id of its directory.
fn set_help_id(menu: &NativeMenu, id: CommandId) -> Result<(), SendToError> {
    let info = MENUINFO {
        cbSize: size_of::<MENUINFO>() as u32,
        fMask: MIM_HELPID,
        dwContextHelpID: id.get(),
        ..Default::default()
    };
    unsafe { SetMenuInfo(menu.handle(), &info) }
        .map_err(|e| SendToError::MenuError(format!("SetMenuInfo failed: {e}")))
}

fn fill(menu: &NativeMenu, nodes: &[MenuNode], store: &EntryStore<Bitmap>) -> Result<(), SendToError> {
    for (position, node) in nodes.iter().enumerate() {
        let mut label = wide_str(&node.label);
        let bitmap = store
            .get(node.id)
            .and_then(|entry| entry.icon())
            .map(Bitmap::handle)
            .unwrap_or(HBITMAP::default());

        let mut item = MENUITEMINFOW {
            cbSize: size_of::<MENUITEMINFOW>() as u32,
            dwTypeData: PWSTR(label.as_mut_ptr()),
            hbmpItem: bitmap,
            ..Default::default()
        };

        match &node.kind {
            NodeKind::Target => {
                item.fMask = MIIM_ID | MIIM_STRING | MIIM_BITMAP;
                item.wID = node.id.get();
                insert_item(menu, position, &item)?;
            }
            NodeKind::Submenu(children) => {
                let submenu = NativeMenu::create()?;
                fill(&submenu, children, store)?;
                set_help_id(&submenu, node.id)?;

                item.fMask = MIIM_SUBMENU | MIIM_STRING | MIIM_BITMAP;
                item.hSubMenu = submenu.handle();
                insert_item(menu, position, &item)?;
                submenu.into_raw();
            }
        }
    }
    Ok(())
}

impl SelectionHost for ShellContext {
    type Icon = Bitmap;
    type Menu = NativeMenu;

    fn render(&self, tree: &MenuTree, store: &EntryStore<Bitmap>) -> Result<NativeMenu, SendToError> {
        let menu = NativeMenu::create()?;
        fill(&menu, &tree.items, store)?;
        Ok(menu)
    }

    fn show_and_select(&self, menu: &NativeMenu) -> Result<Option<CommandId>, SendToError> {
        let owner = self.owner.hwnd();

        let mut cursor = POINT::default();
        unsafe { GetCursorPos(&mut cursor) }
            .map_err(|e| SendToError::MenuError(format!("GetCursorPos failed: {e}")))?;

        let flags = TPM_RETURNCMD | TPM_NONOTIFY | TPM_LEFTALIGN | TPM_LEFTBUTTON;
        let chosen = unsafe {
            let _ = SetForegroundWindow(owner);
            let chosen = TrackPopupMenuEx(menu.handle(), flags.0, cursor.x, cursor.y, owner, None);
            // Leave menu mode so the next input is not swallowed.
            let _ = PostMessageW(owner, WM_NULL, WPARAM(0), LPARAM(0));
            chosen
        };

        // 0 is both "dismissed" and "failed" for TPM_RETURNCMD.
        Ok(CommandId::new(chosen.0 as u32))
    }
}
