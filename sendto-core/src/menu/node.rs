//! Owned menu tree produced by the builder.
//!
//! [`MenuNode`] holds no native handles; rendering to a real popup menu
//! happens later in the selection host.  [`MenuSnapshot`] joins the tree
//! with the entry store for serialisation.

use std::path::PathBuf;

use serde::Serialize;

use crate::store::{CommandId, EntryStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Selectable leaf (a file).
    Target,
    /// Nested popup (a directory); may be empty when pruned by depth.
    Submenu(Vec<MenuNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub id: CommandId,
    pub label: String,
    pub kind: NodeKind,
}

impl MenuNode {
    pub fn target(id: CommandId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            kind: NodeKind::Target,
        }
    }

    pub fn submenu(id: CommandId, label: impl Into<String>, children: Vec<MenuNode>) -> Self {
        Self {
            id,
            label: label.into(),
            kind: NodeKind::Submenu(children),
        }
    }

    pub fn children(&self) -> &[MenuNode] {
        match &self.kind {
            NodeKind::Target => &[],
            NodeKind::Submenu(children) => children,
        }
    }

    pub fn is_submenu(&self) -> bool {
        matches!(self.kind, NodeKind::Submenu(_))
    }
}

/// Root level of the menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuTree {
    pub items: Vec<MenuNode>,
}

impl MenuTree {
    /// Depth-first pre-order walk yielding `(level, node)`.
    pub fn walk(&self) -> Vec<(usize, &MenuNode)> {
        fn visit<'a>(nodes: &'a [MenuNode], level: usize, out: &mut Vec<(usize, &'a MenuNode)>) {
            for node in nodes {
                out.push((level, node));
                visit(node.children(), level + 1, out);
            }
        }

        let mut out = Vec::new();
        visit(&self.items, 0, &mut out);
        out
    }

    /// Total number of nodes across all levels.
    pub fn node_count(&self) -> usize {
        self.walk().len()
    }

    pub fn find(&self, id: CommandId) -> Option<&MenuNode> {
        self.walk()
            .into_iter()
            .map(|(_, node)| node)
            .find(|node| node.id == id)
    }
}

/// Label shown for a file: its name without the last extension.
///
/// A leading dot is not an extension (`.profile` stays `.profile`).
pub fn display_label(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}

/// Serialisable view of one menu node and its store record.
#[derive(Debug, Clone, Serialize)]
pub struct MenuSnapshot {
    pub id: CommandId,
    pub label: String,
    pub path: PathBuf,
    pub has_icon: bool,
    pub submenu: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuSnapshot>,
}

/// Join `tree` with `store` into owned snapshots.
pub fn snapshot<I>(tree: &MenuTree, store: &EntryStore<I>) -> Vec<MenuSnapshot> {
    fn convert<I>(nodes: &[MenuNode], store: &EntryStore<I>) -> Vec<MenuSnapshot> {
        nodes
            .iter()
            .map(|node| {
                let entry = store.get(node.id);
                MenuSnapshot {
                    id: node.id,
                    label: node.label.clone(),
                    path: entry.map(|e| e.path().to_path_buf()).unwrap_or_default(),
                    has_icon: entry.and_then(|e| e.icon()).is_some(),
                    submenu: node.is_submenu(),
                    children: convert(node.children(), store),
                }
            })
            .collect()
    }

    convert(&tree.items, store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> CommandId {
        CommandId::new(raw).unwrap()
    }

    #[test]
    fn test_display_label_strips_last_extension() {
        assert_eq!(display_label("Notepad.lnk"), "Notepad");
        assert_eq!(display_label("archive.tar.gz"), "archive.tar");
        assert_eq!(display_label("README"), "README");
        assert_eq!(display_label(".profile"), ".profile");
        assert_eq!(display_label("Desktop (create shortcut).DeskLink"), "Desktop (create shortcut)");
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = MenuTree {
            items: vec![
                MenuNode::submenu(id(1), "Docs", vec![MenuNode::target(id(2), "B")]),
                MenuNode::target(id(3), "C"),
            ],
        };
        let order: Vec<(usize, u32)> = tree.walk().iter().map(|(l, n)| (*l, n.id.get())).collect();
        assert_eq!(order, vec![(0, 1), (1, 2), (0, 3)]);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.find(id(2)).unwrap().label, "B");
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut store: EntryStore<()> = EntryStore::new();
        store.push(PathBuf::from("root/Docs"), Some(())).unwrap();
        store.push(PathBuf::from("root/Docs/B.txt"), None).unwrap();
        let tree = MenuTree {
            items: vec![MenuNode::submenu(id(1), "Docs", vec![MenuNode::target(id(2), "B")])],
        };

        let snaps = snapshot(&tree, &store);
        assert!(snaps[0].has_icon);
        assert!(!snaps[0].children[0].has_icon);

        let json = serde_json::to_string(&snaps).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"label\":\"B\""));
        assert!(json.contains("\"submenu\":true"));
    }
}
