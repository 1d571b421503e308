//! One invocation end to end: build, show, dispatch, tear down.
//!
//! The session owns the menu and the entry store for its whole duration.
//! Teardown releases the store (and with it every icon) before the native
//! menu; the shell context itself is the caller's and outlives both.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::SendToConfig;
use crate::dispatch::{self, DispatchOutcome, ShellDispatch};
use crate::errors::SendToError;
use crate::host::SelectionHost;
use crate::icon::IconResolver;
use crate::menu::{BuiltMenu, MenuBuilder};
use crate::store::CommandId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The menu was closed without a choice.
    Dismissed,
    Dispatched {
        id: CommandId,
        outcome: DispatchOutcome,
    },
}

/// Run a full session against `shell`.
///
/// `sources` are the files to send; empty means "open the chosen target".
pub fn run<S>(
    shell: &S,
    config: &SendToConfig,
    sources: &[PathBuf],
) -> Result<SessionOutcome, SendToError>
where
    S: IconResolver + SelectionHost<Icon = <S as IconResolver>::Icon> + ShellDispatch,
{
    config.validate()?;

    let BuiltMenu { tree, mut store } = MenuBuilder::new(shell, config).build(&config.root)?;
    log::info!(
        "menu ready: {} entries under {}",
        store.len(),
        config.root.display()
    );

    let menu = shell.render(&tree, &store)?;

    let result = match shell.show_and_select(&menu) {
        Ok(None) => {
            log::debug!("menu dismissed");
            Ok(SessionOutcome::Dismissed)
        }
        Ok(Some(id)) => match store.get(id) {
            Some(entry) => dispatch::dispatch(shell, entry, sources)
                .map(|outcome| SessionOutcome::Dispatched { id, outcome }),
            None => Err(SendToError::MenuError(format!(
                "selection {id} has no entry"
            ))),
        },
        Err(e) => Err(e),
    };

    store.destroy();
    drop(menu);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::tempdir;

    use crate::dispatch::tests::{Call, FakeShell, FakeTarget, Tracked};
    use crate::dispatch::DropEffect;
    use crate::icon::EntryKind;
    use crate::menu::MenuTree;
    use crate::store::EntryStore;

    type Events = Rc<RefCell<Vec<String>>>;

    struct LoggedIcon {
        name: String,
        events: Events,
    }

    impl Drop for LoggedIcon {
        fn drop(&mut self) {
            self.events.borrow_mut().push(format!("icon {}", self.name));
        }
    }

    struct LoggedMenu {
        events: Events,
    }

    impl Drop for LoggedMenu {
        fn drop(&mut self) {
            self.events.borrow_mut().push("menu".into());
        }
    }

    /// Picks the entry whose path ends with `pick`, or dismisses.
    struct SessionShell {
        pick: Option<&'static str>,
        picked: RefCell<Option<CommandId>>,
        events: Events,
        inner: FakeShell,
    }

    impl SessionShell {
        fn new(pick: Option<&'static str>) -> Self {
            Self {
                pick,
                picked: RefCell::new(None),
                events: Events::default(),
                inner: FakeShell::accepting(DropEffect::COPY),
            }
        }

        fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    impl IconResolver for SessionShell {
        type Icon = LoggedIcon;

        fn resolve_icon(&self, path: &Path, _kind: EntryKind) -> Option<LoggedIcon> {
            Some(LoggedIcon {
                name: path.file_name()?.to_string_lossy().into_owned(),
                events: self.events.clone(),
            })
        }
    }

    impl SelectionHost for SessionShell {
        type Icon = LoggedIcon;
        type Menu = LoggedMenu;

        fn render(&self, tree: &MenuTree, store: &EntryStore<LoggedIcon>) -> Result<LoggedMenu, SendToError> {
            assert_eq!(tree.node_count(), store.len());
            let picked = self.pick.and_then(|suffix| {
                store
                    .iter()
                    .find(|(_, entry)| entry.path().ends_with(suffix))
                    .map(|(id, _)| id)
            });
            *self.picked.borrow_mut() = picked;
            Ok(LoggedMenu {
                events: self.events.clone(),
            })
        }

        fn show_and_select(&self, _menu: &LoggedMenu) -> Result<Option<CommandId>, SendToError> {
            Ok(*self.picked.borrow())
        }
    }

    impl ShellDispatch for SessionShell {
        type Item = Tracked;
        type DataObject = Vec<Tracked>;
        type Target = FakeTarget;

        fn open(&self, path: &Path) -> Result<(), SendToError> {
            self.inner.open(path)
        }

        fn parse_item(&self, path: &Path) -> Result<Tracked, SendToError> {
            self.inner.parse_item(path)
        }

        fn bind_data_object(&self, items: &[Tracked]) -> Result<Vec<Tracked>, SendToError> {
            self.inner.bind_data_object(items)
        }

        fn bind_drop_target(&self, item: &Tracked) -> Result<FakeTarget, SendToError> {
            self.inner.bind_drop_target(item)
        }
    }

    fn sendto_root() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Notepad.lnk"), b"").unwrap();
        fs::create_dir(dir.path().join("Backup")).unwrap();
        dir
    }

    #[test]
    fn test_dismissed_menu_dispatches_nothing() {
        let root = sendto_root();
        let shell = SessionShell::new(None);
        let config = SendToConfig::new(root.path());

        let outcome = run(&shell, &config, &[]).unwrap();
        assert_eq!(outcome, SessionOutcome::Dismissed);
        assert!(shell.inner.calls().is_empty());
    }

    #[test]
    fn test_selection_without_sources_opens() {
        let root = sendto_root();
        let shell = SessionShell::new(Some("Notepad.lnk"));
        let config = SendToConfig::new(root.path());

        let outcome = run(&shell, &config, &[]).unwrap();
        match outcome {
            SessionOutcome::Dispatched { outcome, .. } => assert_eq!(outcome, DispatchOutcome::Opened),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            shell.inner.calls(),
            vec![Call::Open(root.path().join("Notepad.lnk"))]
        );
    }

    #[test]
    fn test_selection_with_sources_drops() {
        let root = sendto_root();
        let shell = SessionShell::new(Some("Backup"));
        let config = SendToConfig::new(root.path());
        let sources = vec![PathBuf::from("/tmp/report.pdf")];

        let outcome = run(&shell, &config, &sources).unwrap();
        match outcome {
            SessionOutcome::Dispatched { outcome, .. } => {
                assert_eq!(outcome, DispatchOutcome::Dropped(DropEffect::COPY))
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(shell.inner.live.get(), 0);
    }

    #[test]
    fn test_store_released_before_menu() {
        let root = sendto_root();
        let shell = SessionShell::new(None);
        let config = SendToConfig::new(root.path());

        run(&shell, &config, &[]).unwrap();
        let events = shell.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events.last().map(String::as_str), Some("menu"));
        assert!(events[..2].iter().all(|e| e.starts_with("icon ")));
    }

    #[test]
    fn test_invalid_root_is_config_error() {
        let root = tempdir().unwrap();
        let shell = SessionShell::new(None);
        let config = SendToConfig::new(root.path().join("missing"));

        let err = run(&shell, &config, &[]).unwrap_err();
        assert!(matches!(err, SendToError::ConfigError(_)));
        assert!(err.is_user_visible());
        assert!(shell.events().is_empty());
    }

    #[test]
    fn test_empty_root_shows_no_menu() {
        let root = tempdir().unwrap();
        let shell = SessionShell::new(None);
        let config = SendToConfig::new(root.path());

        let err = run(&shell, &config, &[]).unwrap_err();
        assert!(matches!(err, SendToError::EmptyMenu(_)));
        assert!(shell.events().is_empty());
    }
}
