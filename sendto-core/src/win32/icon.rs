//! Shell icons as 32-bit top-down DIB sections for menu items.
//!
//! Menus draw `hbmpItem` with per-pixel alpha only when the bitmap is a
//! 32bpp DIB, so every icon the shell hands out is redrawn into one.
//! Intermediate icon and GDI handles are owned by small RAII wrappers and
//! released exactly once.

use std::ffi::c_void;
use std::mem::size_of;
use std::path::Path;

use windows::core::{Interface, PCWSTR};
use windows::Win32::Foundation::{HANDLE, MAX_PATH};
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetObjectW, SelectObject,
    BITMAP, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP, HBRUSH, HDC,
};
use windows::Win32::Storage::FileSystem::{
    FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_NORMAL, FILE_FLAGS_AND_ATTRIBUTES,
};
use windows::Win32::System::SystemInformation::GetWindowsDirectoryW;
use windows::Win32::UI::Controls::{IImageList, ILD_TRANSPARENT};
use windows::Win32::UI::Shell::{
    SHGetFileInfoW, SHGetImageList, SHFILEINFOW, SHGFI_FLAGS, SHGFI_ICON, SHGFI_LINKOVERLAY,
    SHGFI_SMALLICON, SHGFI_SYSICONINDEX, SHGFI_USEFILEATTRIBUTES, SHIL_SMALL,
};
use windows::Win32::UI::WindowsAndMessaging::{DestroyIcon, DrawIconEx, GetIconInfo, DI_NORMAL, HICON, ICONINFO};

use super::{wide_path, ShellContext};
use crate::icon::{icon_plan, EntryKind, IconResolver, IconTier};

// ---------------------------------------------------------------------------
// Owned handles
// ---------------------------------------------------------------------------

/// A 32-bit ARGB DIB section, deleted on drop.
#[derive(Debug)]
pub struct Bitmap(HBITMAP);

impl Bitmap {
    pub fn handle(&self) -> HBITMAP {
        self.0
    }
}

impl Drop for Bitmap {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.0);
        }
    }
}

struct OwnedIcon(HICON);

impl Drop for OwnedIcon {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyIcon(self.0);
        }
    }
}

/// The colour and mask bitmaps `GetIconInfo` creates for the caller.
struct IconParts {
    color: HBITMAP,
    mask: HBITMAP,
}

impl Drop for IconParts {
    fn drop(&mut self) {
        unsafe {
            if !self.color.is_invalid() {
                let _ = DeleteObject(self.color);
            }
            if !self.mask.is_invalid() {
                let _ = DeleteObject(self.mask);
            }
        }
    }
}

struct MemoryDc(HDC);

impl MemoryDc {
    fn new() -> Option<Self> {
        let dc = unsafe { CreateCompatibleDC(HDC::default()) };
        (!dc.is_invalid()).then_some(Self(dc))
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteDC(self.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn dib_section(width: i32, height: i32) -> Option<Bitmap> {
    let bmi = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            // top-down
            biHeight: -height,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut bits: *mut c_void = std::ptr::null_mut();
    let bitmap = unsafe {
        CreateDIBSection(HDC::default(), &bmi, DIB_RGB_COLORS, &mut bits, HANDLE::default(), 0)
    }
    .ok()?;
    Some(Bitmap(bitmap))
}

/// Redraw `icon` into a fresh DIB section of the icon's own size.
fn bitmap_from_icon(icon: OwnedIcon) -> Option<Bitmap> {
    let mut info = ICONINFO::default();
    unsafe { GetIconInfo(icon.0, &mut info) }.ok()?;
    let parts = IconParts {
        color: info.hbmColor,
        mask: info.hbmMask,
    };

    // Monochrome icons stack AND and XOR masks in one double-height bitmap.
    let (source, monochrome) = if parts.color.is_invalid() {
        (parts.mask, true)
    } else {
        (parts.color, false)
    };

    let mut metrics = BITMAP::default();
    let copied = unsafe {
        GetObjectW(
            source,
            size_of::<BITMAP>() as i32,
            Some(&mut metrics as *mut BITMAP as *mut c_void),
        )
    };
    if copied == 0 {
        return None;
    }

    let width = metrics.bmWidth;
    let height = if monochrome {
        metrics.bmHeight / 2
    } else {
        metrics.bmHeight
    };

    let bitmap = dib_section(width, height)?;
    let dc = MemoryDc::new()?;
    unsafe {
        let previous = SelectObject(dc.0, bitmap.handle());
        let drawn = DrawIconEx(dc.0, 0, 0, icon.0, width, height, 0, HBRUSH::default(), DI_NORMAL);
        SelectObject(dc.0, previous);
        drawn.ok()?;
    }
    Some(bitmap)
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

fn file_info(path: &Path, attributes: FILE_FLAGS_AND_ATTRIBUTES, flags: SHGFI_FLAGS) -> Option<SHFILEINFOW> {
    let wide = wide_path(path);
    let mut info = SHFILEINFOW::default();
    let result = unsafe {
        SHGetFileInfoW(
            PCWSTR(wide.as_ptr()),
            attributes,
            Some(&mut info),
            size_of::<SHFILEINFOW>() as u32,
            flags,
        )
    };
    (result != 0).then_some(info)
}

fn shell_icon(path: &Path, kind: EntryKind, link_overlay: bool) -> Option<Bitmap> {
    let attributes = match kind {
        EntryKind::Directory => FILE_FLAGS_AND_ATTRIBUTES(0),
        EntryKind::File => FILE_ATTRIBUTE_NORMAL,
    };
    let flags = if link_overlay {
        SHGFI_ICON | SHGFI_SMALLICON | SHGFI_LINKOVERLAY
    } else {
        SHGFI_ICON | SHGFI_SMALLICON
    };

    let info = file_info(path, attributes, flags)?;
    if info.hIcon.is_invalid() {
        return None;
    }
    bitmap_from_icon(OwnedIcon(info.hIcon))
}

fn system_list_icon(list: &IImageList, path: &Path) -> Option<Bitmap> {
    let info = file_info(
        path,
        FILE_ATTRIBUTE_NORMAL,
        SHGFI_USEFILEATTRIBUTES | SHGFI_SYSICONINDEX | SHGFI_SMALLICON,
    )?;
    let icon = unsafe { list.GetIcon(info.iIcon, ILD_TRANSPARENT.0) }.ok()?;
    bitmap_from_icon(OwnedIcon(icon))
}

/// The shared small system image list.
///
/// Prefers `SHGetImageList`; otherwise takes the list handle returned for
/// the Windows directory, which is the same object behind a plain handle.
pub(super) fn load_small_image_list() -> Option<IImageList> {
    match unsafe { SHGetImageList::<IImageList>(SHIL_SMALL as i32) } {
        Ok(list) => return Some(list),
        Err(e) => log::debug!("SHGetImageList failed: {e}"),
    }

    let mut buffer = [0u16; MAX_PATH as usize];
    let len = unsafe { GetWindowsDirectoryW(Some(&mut buffer)) } as usize;
    if len == 0 || len >= buffer.len() {
        return None;
    }
    let mut info = SHFILEINFOW::default();
    let handle = unsafe {
        SHGetFileInfoW(
            PCWSTR(buffer.as_ptr()),
            FILE_ATTRIBUTE_DIRECTORY,
            Some(&mut info),
            size_of::<SHFILEINFOW>() as u32,
            SHGFI_SYSICONINDEX | SHGFI_SMALLICON,
        )
    };
    if handle == 0 {
        return None;
    }

    let raw = handle as *mut c_void;
    // Borrowed from the shell; cloning takes our own reference.
    unsafe { IImageList::from_raw_borrowed(&raw) }.cloned()
}

impl IconResolver for ShellContext {
    type Icon = Bitmap;

    fn resolve_icon(&self, path: &Path, kind: EntryKind) -> Option<Bitmap> {
        icon_plan(path, kind).into_iter().find_map(|tier| match tier {
            IconTier::Shell { link_overlay } => shell_icon(path, kind, link_overlay),
            IconTier::SystemList => self
                .small_image_list()
                .and_then(|list| system_list_icon(list, path)),
        })
    }
}
