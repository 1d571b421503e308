//! Win32 shell context.
//!
//! [`ShellContext`] is the one object that talks to the operating system.
//! It implements [`IconResolver`](crate::icon::IconResolver),
//! [`SelectionHost`](crate::host::SelectionHost) and
//! [`ShellDispatch`](crate::dispatch::ShellDispatch), and owns everything
//! that must outlive a session:
//!
//! | Resource | Released |
//! |----------|----------|
//! | hidden owner window | first |
//! | shared small image list (lazy) | second |
//! | OLE apartment | last |
//!
//! Field order below is the release order.

pub mod com;
pub mod icon;
pub mod menu;
pub mod shell;

use std::cell::OnceCell;
use std::mem::size_of;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Controls::{
    IImageList, InitCommonControlsEx, ICC_STANDARD_CLASSES, INITCOMMONCONTROLSEX,
};
use windows::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};

pub use com::OleGuard;
pub use icon::Bitmap;
pub use menu::NativeMenu;
pub use shell::{Pidl, ShellDropTarget};

use crate::errors::SendToError;

pub struct ShellContext {
    owner: menu::OwnerWindow,
    image_list: OnceCell<Option<IImageList>>,
    _ole: OleGuard,
}

impl ShellContext {
    /// Initialise OLE and common controls, then create the owner window.
    pub fn new() -> Result<Self, SendToError> {
        let ole = OleGuard::init()?;

        let controls = INITCOMMONCONTROLSEX {
            dwSize: size_of::<INITCOMMONCONTROLSEX>() as u32,
            dwICC: ICC_STANDARD_CLASSES,
        };
        if !unsafe { InitCommonControlsEx(&controls) }.as_bool() {
            return Err(SendToError::ComError("InitCommonControlsEx failed".into()));
        }

        let owner = menu::OwnerWindow::create()?;
        log::debug!("shell context ready");
        Ok(Self {
            owner,
            image_list: OnceCell::new(),
            _ole: ole,
        })
    }

    fn small_image_list(&self) -> Option<&IImageList> {
        self.image_list
            .get_or_init(icon::load_small_image_list)
            .as_ref()
    }
}

/// Show `err` in a modal error box.
pub fn show_error(err: &SendToError) {
    let text = wide_str(&err.to_string());
    unsafe {
        MessageBoxW(
            HWND::default(),
            PCWSTR(text.as_ptr()),
            w!("SendTo+ Error"),
            MB_ICONERROR | MB_OK,
        );
    }
}

/// NUL-terminated UTF-16 copy of `path`.
pub(crate) fn wide_path(path: &Path) -> Vec<u16> {
    path.as_os_str().encode_wide().chain(Some(0)).collect()
}

pub(crate) fn wide_str(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(Some(0)).collect()
}
