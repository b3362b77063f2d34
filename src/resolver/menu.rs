//! One-level grouping of resolved menu entries.

use serde::Serialize;

use crate::resolver::merge::ResolvedField;

/// A top-level menu entry with its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode<'a> {
    #[serde(flatten)]
    pub entry: ResolvedField<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResolvedField<'a>>,
}

/// Group resolved entries by `parent_path`.
///
/// An entry becomes a child only when its parent is present in `entries`
/// and is itself top-level; otherwise it is promoted to the top level.
/// Both levels keep the order of `entries`.
pub fn group_menu<'a>(entries: &[ResolvedField<'a>]) -> Vec<MenuNode<'a>> {
    let mut nodes: Vec<MenuNode<'a>> = entries
        .iter()
        .filter(|e| is_root(e, entries))
        .map(|e| MenuNode {
            entry: e.clone(),
            children: Vec::new(),
        })
        .collect();

    for entry in entries.iter().filter(|e| !is_root(e, entries)) {
        let parent = entry.default.parent_path.as_deref();
        if let Some(node) = nodes.iter_mut().find(|n| Some(n.entry.name) == parent) {
            node.children.push(entry.clone());
        }
    }

    nodes
}

fn is_root(entry: &ResolvedField<'_>, entries: &[ResolvedField<'_>]) -> bool {
    match entry.default.parent_path.as_deref() {
        None => true,
        Some(parent) => !entries
            .iter()
            .any(|p| p.name == parent && p.default.parent_path.is_none()),
    }
}
