//! Dispatch of a chosen entry: open it, or drop the source files onto it.
//!
//! With no source paths the target is opened the way a double-click in the
//! file browser would.  Otherwise every source and the target are resolved
//! to shell items, bound to a data object and a drop target, and driven
//! through the drag protocol:
//!
//! ```text
//! Idle -> Entered -> Dropped         (target reported a non-empty effect)
//!                 -> LeftWithoutDrop (empty effect, or enter failed)
//! ```
//!
//! Resolution and binding happen before the first protocol call, so a
//! failure there leaves the target untouched.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::SendToError;
use crate::store::MenuEntry;

// ---------------------------------------------------------------------------
// Drop effects
// ---------------------------------------------------------------------------

/// Bit set of drop effects.  Bit values follow OLE `DROPEFFECT_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct DropEffect(u32);

impl DropEffect {
    pub const NONE: DropEffect = DropEffect(0);
    pub const COPY: DropEffect = DropEffect(1);
    pub const MOVE: DropEffect = DropEffect(2);
    pub const LINK: DropEffect = DropEffect(4);
    /// Everything a simulated drag offers.
    pub const ALL: DropEffect = DropEffect(1 | 2 | 4);

    pub const fn from_bits(bits: u32) -> Self {
        DropEffect(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: DropEffect) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for DropEffect {
    type Output = DropEffect;

    fn bitor(self, rhs: DropEffect) -> DropEffect {
        DropEffect(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// "Something files can be dropped onto", reduced to three calls.
pub trait DropTarget {
    type Data;

    /// Offer `data` with `allowed` effects; returns the effect the target
    /// would perform (empty = refused).
    fn drag_enter(&mut self, data: &Self::Data, allowed: DropEffect)
        -> Result<DropEffect, SendToError>;

    /// Complete the transfer.
    fn drop_data(&mut self, data: &Self::Data, effect: DropEffect)
        -> Result<DropEffect, SendToError>;

    /// Cancel an entered drag.
    fn drag_leave(&mut self) -> Result<(), SendToError>;
}

/// Shell capabilities the dispatcher needs.
///
/// Items, data objects and targets release their native resources on
/// `Drop`, so every early return cleans up after itself.
pub trait ShellDispatch {
    type Item;
    type DataObject;
    type Target: DropTarget<Data = Self::DataObject>;

    /// The shell's default verb on `path`.
    fn open(&self, path: &Path) -> Result<(), SendToError>;

    /// Resolve `path` to an opaque shell item identifier.
    fn parse_item(&self, path: &Path) -> Result<Self::Item, SendToError>;

    /// Bundle `items` into a transferable data object.
    fn bind_data_object(&self, items: &[Self::Item]) -> Result<Self::DataObject, SendToError>;

    /// The drop-target capability of `item`.
    fn bind_drop_target(&self, item: &Self::Item) -> Result<Self::Target, SendToError>;
}

// ---------------------------------------------------------------------------
// Drop protocol
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropState {
    Idle,
    Entered(DropEffect),
    Dropped(DropEffect),
    LeftWithoutDrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Opened,
    Dropped(DropEffect),
    Rejected,
}

/// Drive enter followed by exactly one of drop or leave.
pub fn run_drop_protocol<T: DropTarget>(
    target: &mut T,
    data: &T::Data,
) -> Result<DispatchOutcome, SendToError> {
    let mut state = DropState::Idle;

    match target.drag_enter(data, DropEffect::ALL) {
        Ok(effect) if !effect.is_empty() => state = DropState::Entered(effect),
        Ok(_) => log::debug!("drop target refused the data"),
        Err(e) => log::warn!("drag enter failed: {e}"),
    }

    match state {
        DropState::Entered(effect) => {
            log::debug!("entered with effect {:#x}", effect.bits());
            let performed = target.drop_data(data, effect)?;
            state = DropState::Dropped(performed);
        }
        _ => {
            target.drag_leave()?;
            state = DropState::LeftWithoutDrop;
        }
    }

    match state {
        DropState::Dropped(effect) => Ok(DispatchOutcome::Dropped(effect)),
        _ => Ok(DispatchOutcome::Rejected),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate dropping `sources` onto `target`.
///
/// Resolution is fail-fast: the first path that cannot be resolved aborts
/// before any protocol call is made.
pub fn drag_and_drop<S: ShellDispatch>(
    shell: &S,
    target: &Path,
    sources: &[PathBuf],
) -> Result<DispatchOutcome, SendToError> {
    if sources.is_empty() {
        return Err(SendToError::DispatchError(
            "drag and drop needs at least one source".into(),
        ));
    }

    let items = sources
        .iter()
        .map(|path| shell.parse_item(path))
        .collect::<Result<Vec<_>, _>>()?;
    let target_item = shell.parse_item(target)?;

    let data = shell.bind_data_object(&items)?;
    let mut drop_target = shell.bind_drop_target(&target_item)?;

    run_drop_protocol(&mut drop_target, &data)
}

/// Act on the chosen entry.
pub fn dispatch<S: ShellDispatch, I>(
    shell: &S,
    entry: &MenuEntry<I>,
    sources: &[PathBuf],
) -> Result<DispatchOutcome, SendToError> {
    if sources.is_empty() {
        log::info!("opening {}", entry.path().display());
        shell.open(entry.path())?;
        return Ok(DispatchOutcome::Opened);
    }

    log::info!(
        "dropping {} file(s) onto {}",
        sources.len(),
        entry.path().display()
    );
    drag_and_drop(shell, entry.path(), sources)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::store::EntryStore;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Open(PathBuf),
        Enter(DropEffect),
        Drop(DropEffect),
        Leave,
    }

    /// Live native-resource counter shared by every fake handle.
    #[derive(Debug)]
    pub struct Tracked {
        pub path: PathBuf,
        live: Rc<Cell<isize>>,
    }

    impl Tracked {
        fn new(path: PathBuf, live: &Rc<Cell<isize>>) -> Self {
            live.set(live.get() + 1);
            Self {
                path,
                live: live.clone(),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    pub struct FakeTarget {
        reply: Result<DropEffect, ()>,
        calls: Rc<RefCell<Vec<Call>>>,
        _handle: Tracked,
    }

    impl DropTarget for FakeTarget {
        type Data = Vec<Tracked>;

        fn drag_enter(&mut self, _data: &Vec<Tracked>, allowed: DropEffect) -> Result<DropEffect, SendToError> {
            self.calls.borrow_mut().push(Call::Enter(allowed));
            self.reply
                .map_err(|_| SendToError::ComError("E_UNEXPECTED".into()))
        }

        fn drop_data(&mut self, _data: &Vec<Tracked>, effect: DropEffect) -> Result<DropEffect, SendToError> {
            self.calls.borrow_mut().push(Call::Drop(effect));
            Ok(effect)
        }

        fn drag_leave(&mut self) -> Result<(), SendToError> {
            self.calls.borrow_mut().push(Call::Leave);
            Ok(())
        }
    }

    /// Shell whose drop target answers enter with `reply`, and which fails
    /// to resolve any path containing `unresolvable`.
    pub struct FakeShell {
        pub reply: Result<DropEffect, ()>,
        pub unresolvable: Option<&'static str>,
        pub calls: Rc<RefCell<Vec<Call>>>,
        pub parsed: RefCell<Vec<PathBuf>>,
        pub live: Rc<Cell<isize>>,
    }

    impl FakeShell {
        pub fn accepting(effect: DropEffect) -> Self {
            Self {
                reply: Ok(effect),
                unresolvable: None,
                calls: Rc::default(),
                parsed: RefCell::default(),
                live: Rc::default(),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl ShellDispatch for FakeShell {
        type Item = Tracked;
        type DataObject = Vec<Tracked>;
        type Target = FakeTarget;

        fn open(&self, path: &Path) -> Result<(), SendToError> {
            self.calls.borrow_mut().push(Call::Open(path.to_path_buf()));
            Ok(())
        }

        fn parse_item(&self, path: &Path) -> Result<Tracked, SendToError> {
            self.parsed.borrow_mut().push(path.to_path_buf());
            if let Some(bad) = self.unresolvable {
                if path.to_string_lossy().contains(bad) {
                    return Err(SendToError::ResolveError(format!("{}", path.display())));
                }
            }
            Ok(Tracked::new(path.to_path_buf(), &self.live))
        }

        fn bind_data_object(&self, items: &[Tracked]) -> Result<Vec<Tracked>, SendToError> {
            Ok(items
                .iter()
                .map(|item| Tracked::new(item.path.clone(), &self.live))
                .collect())
        }

        fn bind_drop_target(&self, item: &Tracked) -> Result<FakeTarget, SendToError> {
            Ok(FakeTarget {
                reply: self.reply,
                calls: self.calls.clone(),
                _handle: Tracked::new(item.path.clone(), &self.live),
            })
        }
    }

    fn entry(path: &str) -> EntryStore<()> {
        let mut store = EntryStore::new();
        store.push(PathBuf::from(path), None).unwrap();
        store
    }

    fn sources() -> Vec<PathBuf> {
        vec![PathBuf::from("C:/in/one.txt"), PathBuf::from("C:/in/two.txt")]
    }

    #[test]
    fn test_no_sources_opens_target() {
        let shell = FakeShell::accepting(DropEffect::COPY);
        let store = entry("C:/sendto/Notepad.lnk");
        let (_, target) = store.iter().next().unwrap();

        let outcome = dispatch(&shell, target, &[]).unwrap();
        assert_eq!(outcome, DispatchOutcome::Opened);
        assert_eq!(shell.calls(), vec![Call::Open(PathBuf::from("C:/sendto/Notepad.lnk"))]);
        assert!(shell.parsed.borrow().is_empty());
    }

    #[test]
    fn test_accepting_target_gets_enter_then_drop() {
        let shell = FakeShell::accepting(DropEffect::COPY);
        let store = entry("C:/sendto/Backup");
        let (_, target) = store.iter().next().unwrap();

        let outcome = dispatch(&shell, target, &sources()).unwrap();
        assert_eq!(outcome, DispatchOutcome::Dropped(DropEffect::COPY));
        assert_eq!(
            shell.calls(),
            vec![Call::Enter(DropEffect::ALL), Call::Drop(DropEffect::COPY)]
        );
        assert_eq!(shell.live.get(), 0);
    }

    #[test]
    fn test_refusing_target_gets_enter_then_leave() {
        let shell = FakeShell::accepting(DropEffect::NONE);
        let store = entry("C:/sendto/Backup");
        let (_, target) = store.iter().next().unwrap();

        let outcome = dispatch(&shell, target, &sources()).unwrap();
        assert_eq!(outcome, DispatchOutcome::Rejected);
        assert_eq!(shell.calls(), vec![Call::Enter(DropEffect::ALL), Call::Leave]);
        assert_eq!(
            *shell.parsed.borrow(),
            vec![
                PathBuf::from("C:/in/one.txt"),
                PathBuf::from("C:/in/two.txt"),
                PathBuf::from("C:/sendto/Backup"),
            ]
        );
    }

    #[test]
    fn test_failed_enter_still_leaves() {
        let mut shell = FakeShell::accepting(DropEffect::COPY);
        shell.reply = Err(());
        let outcome = drag_and_drop(&shell, Path::new("C:/sendto/x"), &sources()).unwrap();
        assert_eq!(outcome, DispatchOutcome::Rejected);
        assert_eq!(shell.calls(), vec![Call::Enter(DropEffect::ALL), Call::Leave]);
    }

    #[test]
    fn test_unresolvable_source_aborts_before_protocol() {
        let mut shell = FakeShell::accepting(DropEffect::COPY);
        shell.unresolvable = Some("two");

        let err = drag_and_drop(&shell, Path::new("C:/sendto/x"), &sources()).unwrap_err();
        assert!(matches!(err, SendToError::ResolveError(_)));
        assert!(shell.calls().is_empty());
        assert_eq!(shell.live.get(), 0);
    }

    #[test]
    fn test_unresolvable_target_aborts_before_protocol() {
        let mut shell = FakeShell::accepting(DropEffect::COPY);
        shell.unresolvable = Some("sendto");

        let err = drag_and_drop(&shell, Path::new("C:/sendto/x"), &sources()).unwrap_err();
        assert!(matches!(err, SendToError::ResolveError(_)));
        assert!(shell.calls().is_empty());
        assert_eq!(shell.live.get(), 0);
    }

    #[test]
    fn test_drop_effect_bits() {
        assert_eq!(DropEffect::ALL, DropEffect::COPY | DropEffect::MOVE | DropEffect::LINK);
        assert!(DropEffect::ALL.contains(DropEffect::LINK));
        assert!(!DropEffect::COPY.contains(DropEffect::MOVE));
        assert!(DropEffect::NONE.is_empty());
        assert_eq!(DropEffect::from_bits(7).bits(), 7);
    }
}
