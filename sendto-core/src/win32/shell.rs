//! Shell items, data objects and drop targets.

use std::path::Path;
use std::ptr;

use windows::core::{Interface, PCWSTR};
use windows::Win32::Foundation::{HWND, POINTL};
use windows::Win32::System::Com::IDataObject;
use windows::Win32::System::Ole::{IDropTarget, DROPEFFECT};
use windows::Win32::System::SystemServices::MK_LBUTTON;
use windows::Win32::UI::Shell::Common::ITEMIDLIST;
use windows::Win32::UI::Shell::{
    ILFree, IShellFolder, SHBindToParent, SHParseDisplayName, ShellExecuteW,
};
use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

use super::{wide_path, ShellContext};
use crate::dispatch::{DropEffect, DropTarget, ShellDispatch};
use crate::errors::SendToError;

/// An absolute item identifier list, freed on drop.
#[derive(Debug)]
pub struct Pidl(*mut ITEMIDLIST);

impl Drop for Pidl {
    fn drop(&mut self) {
        unsafe { ILFree(Some(self.0)) };
    }
}

pub struct ShellDropTarget(IDropTarget);

impl DropTarget for ShellDropTarget {
    type Data = IDataObject;

    fn drag_enter(&mut self, data: &IDataObject, allowed: DropEffect) -> Result<DropEffect, SendToError> {
        let mut effect = DROPEFFECT(allowed.bits());
        unsafe { self.0.DragEnter(data, MK_LBUTTON, &POINTL::default(), &mut effect) }
            .map_err(|e| SendToError::ComError(format!("DragEnter failed: {e}")))?;
        Ok(DropEffect::from_bits(effect.0))
    }

    fn drop_data(&mut self, data: &IDataObject, effect: DropEffect) -> Result<DropEffect, SendToError> {
        let mut effect = DROPEFFECT(effect.bits());
        unsafe { self.0.Drop(data, MK_LBUTTON, &POINTL::default(), &mut effect) }
            .map_err(|e| SendToError::DispatchError(format!("Drop failed: {e}")))?;
        Ok(DropEffect::from_bits(effect.0))
    }

    fn drag_leave(&mut self) -> Result<(), SendToError> {
        unsafe { self.0.DragLeave() }
            .map_err(|e| SendToError::ComError(format!("DragLeave failed: {e}")))
    }
}

/// Ask the parent folder of `items` for a UI object over all of them.
///
/// Children are taken relative to the parent of the last item, so items
/// are expected to share one folder.
fn ui_object_of<T: Interface>(owner: HWND, items: &[Pidl]) -> Result<T, SendToError> {
    let mut parent: Option<IShellFolder> = None;
    let mut children = Vec::with_capacity(items.len());

    for item in items {
        let mut child: *mut ITEMIDLIST = ptr::null_mut();
        let folder: IShellFolder = unsafe { SHBindToParent(item.0, Some(&mut child)) }
            .map_err(|e| SendToError::ResolveError(format!("SHBindToParent failed: {e}")))?;
        children.push(child as *const ITEMIDLIST);
        parent = Some(folder);
    }

    let parent = parent
        .ok_or_else(|| SendToError::DispatchError("no shell items to bind".into()))?;
    unsafe { parent.GetUIObjectOf(owner, &children, None) }
        .map_err(|e| SendToError::ComError(format!("GetUIObjectOf failed: {e}")))
}

impl ShellDispatch for ShellContext {
    type Item = Pidl;
    type DataObject = IDataObject;
    type Target = ShellDropTarget;

    fn open(&self, path: &Path) -> Result<(), SendToError> {
        let wide = wide_path(path);
        let result = unsafe {
            ShellExecuteW(
                HWND::default(),
                PCWSTR::null(),
                PCWSTR(wide.as_ptr()),
                PCWSTR::null(),
                PCWSTR::null(),
                SW_SHOWNORMAL,
            )
        };
        // Values up to 32 are error codes.
        let code = result.0 as isize;
        if code <= 32 {
            return Err(SendToError::DispatchError(format!(
                "ShellExecuteW failed for {}: code {code}",
                path.display()
            )));
        }
        Ok(())
    }

    fn parse_item(&self, path: &Path) -> Result<Pidl, SendToError> {
        let wide = wide_path(path);
        let mut pidl: *mut ITEMIDLIST = ptr::null_mut();
        unsafe { SHParseDisplayName(PCWSTR(wide.as_ptr()), None, &mut pidl, 0, None) }
            .map_err(|e| SendToError::ResolveError(format!("{}: {e}", path.display())))?;
        if pidl.is_null() {
            return Err(SendToError::ResolveError(format!(
                "{}: no item identifier",
                path.display()
            )));
        }
        Ok(Pidl(pidl))
    }

    fn bind_data_object(&self, items: &[Pidl]) -> Result<IDataObject, SendToError> {
        ui_object_of(self.owner.hwnd(), items)
    }

    fn bind_drop_target(&self, item: &Pidl) -> Result<ShellDropTarget, SendToError> {
        let target = ui_object_of(self.owner.hwnd(), std::slice::from_ref(item))?;
        Ok(ShellDropTarget(target))
    }
}
