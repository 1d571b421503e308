//! OLE apartment RAII guard.
//!
//! [`OleGuard`] pairs `OleInitialize` with `OleUninitialize`.  Drag and
//! drop needs the single-threaded apartment that `OleInitialize` sets up;
//! a plain multithreaded COM apartment is not enough.
//!
//! The `PhantomData<*const ()>` field keeps the guard `!Send` + `!Sync`,
//! pinning it to the thread that initialised OLE.

use std::marker::PhantomData;

use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::System::Ole::{OleInitialize, OleUninitialize};

use crate::errors::SendToError;

#[must_use = "OleGuard must be kept alive while shell objects are in use"]
pub struct OleGuard {
    should_uninit: bool,
    _not_send: PhantomData<*const ()>,
}

impl OleGuard {
    /// Initialise OLE on the current thread.
    ///
    /// `RPC_E_CHANGED_MODE` means the thread already joined an apartment of
    /// another kind; the guard is then returned without a balancing
    /// `OleUninitialize`.
    pub fn init() -> Result<Self, SendToError> {
        match unsafe { OleInitialize(None) } {
            Ok(()) => Ok(Self {
                should_uninit: true,
                _not_send: PhantomData,
            }),
            Err(e) if e.code() == RPC_E_CHANGED_MODE => {
                log::warn!("OleInitialize: RPC_E_CHANGED_MODE, drag and drop may be unavailable");
                Ok(Self {
                    should_uninit: false,
                    _not_send: PhantomData,
                })
            }
            Err(e) => Err(SendToError::ComError(format!(
                "OleInitialize failed: HRESULT 0x{:08X}",
                e.code().0 as u32
            ))),
        }
    }
}

impl Drop for OleGuard {
    fn drop(&mut self) {
        if self.should_uninit {
            unsafe { OleUninitialize() };
        }
    }
}
