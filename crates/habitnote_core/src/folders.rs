//! Folder navigation tree derived from the flat parent-pointer list.
//!
//! # Responsibility
//! - Turn the folder snapshot into ordered, indented display rows.
//! - Answer scope questions (descendants) and parenting questions (cycles).
//!
//! # Invariants
//! - The first row is always the synthetic "All Notes" row at level 0.
//! - Roots keep input order; each root's subtree is emitted depth-first
//!   pre-order before the next root. Siblings keep input order.
//! - Traversal only follows child links from roots, so folders caught in a
//!   parent cycle are unreachable and never emitted.

use crate::model::folder::{Folder, FolderId};
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Label of the synthetic aggregate row.
pub const ALL_NOTES_LABEL: &str = "All Notes";

/// One row of the folder navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderRow {
    /// `None` for the synthetic "All Notes" row.
    pub folder_id: Option<FolderId>,
    pub name: String,
    pub color: Option<String>,
    /// 0 for "All Notes", 1 for root folders, +1 per nesting step.
    pub level: usize,
    pub has_children: bool,
}

impl FolderRow {
    fn all_notes() -> Self {
        Self {
            folder_id: None,
            name: ALL_NOTES_LABEL.to_string(),
            color: None,
            level: 0,
            has_children: false,
        }
    }
}

/// Builds ordered display rows from a flat folder list.
pub fn build_folder_rows(folders: &[Folder]) -> Vec<FolderRow> {
    let children = index_children(folders);
    let mut rows = Vec::with_capacity(folders.len() + 1);
    rows.push(FolderRow::all_notes());

    // Stack of (folder, level); children pushed in reverse to pop in order.
    let mut stack = children
        .get(&None)
        .map(|roots| roots.iter().rev().map(|folder| (*folder, 1)).collect::<Vec<_>>())
        .unwrap_or_default();

    while let Some((folder, level)) = stack.pop() {
        let kids = children.get(&Some(folder.id));
        rows.push(FolderRow {
            folder_id: Some(folder.id),
            name: folder.name.clone(),
            color: folder.color.clone(),
            level,
            has_children: kids.is_some_and(|kids| !kids.is_empty()),
        });
        if let Some(kids) = kids {
            stack.extend(kids.iter().rev().map(|child| (*child, level + 1)));
        }
    }

    debug!(
        "event=folder_tree_built module=folders status=ok folders={} rows={}",
        folders.len(),
        rows.len()
    );
    rows
}

/// Returns ids of every folder below `folder_id`, excluding itself.
pub fn descendant_ids(folders: &[Folder], folder_id: FolderId) -> Vec<FolderId> {
    let children = index_children(folders);
    let mut result = Vec::new();
    let mut visited = HashSet::from([folder_id]);
    let mut stack = vec![folder_id];
    while let Some(current) = stack.pop() {
        for child in children.get(&Some(current)).into_iter().flatten() {
            if visited.insert(child.id) {
                result.push(child.id);
                stack.push(child.id);
            }
        }
    }
    result
}

/// Returns whether parenting `folder_id` under `candidate_parent` creates a cycle.
///
/// Walks the parent chain upward from `candidate_parent`; reaching
/// `folder_id`, or revisiting a node of an already-corrupt chain, is a cycle.
pub fn would_create_cycle(
    folders: &[Folder],
    folder_id: FolderId,
    candidate_parent: FolderId,
) -> bool {
    let parents = folders
        .iter()
        .map(|folder| (folder.id, folder.parent_id))
        .collect::<HashMap<_, _>>();
    let mut visited = HashSet::new();
    let mut cursor = Some(candidate_parent);
    while let Some(current) = cursor {
        if current == folder_id || !visited.insert(current) {
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

fn index_children(folders: &[Folder]) -> HashMap<Option<FolderId>, Vec<&Folder>> {
    let mut children: HashMap<Option<FolderId>, Vec<&Folder>> = HashMap::new();
    for folder in folders {
        children.entry(folder.parent_id).or_default().push(folder);
    }
    children
}
