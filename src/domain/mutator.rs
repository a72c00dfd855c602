//! Tree mutator: pure operations over a template.
//!
//! Every operation borrows its input and never modifies it. Operations that can
//! be no-ops return `Cow::Borrowed(input)` for "same tree" and `Cow::Owned` for a
//! new tree, so snapshots held elsewhere stay valid and callers can tell whether
//! anything changed without comparing trees.

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId, NodePatch};
use crate::domain::template::{check_structure, Template};

/// A duplicated subtree: the new tree and the id of the copy.
#[derive(Debug, Clone)]
pub struct Duplicated {
    pub tree: Template,
    pub id: NodeId,
}

/// Insert `node` as child `index` of `parent` (root when `None`).
///
/// `index` is clamped to `[0, len]`.
#[instrument(level = "debug", skip(tree, node), fields(node = %node.id()))]
pub fn insert(
    tree: &Template,
    node: Node,
    parent: Option<&NodeId>,
    index: usize,
) -> DomainResult<Template> {
    if node.is_column() {
        return Err(DomainError::ColumnPlacement(*node.id()));
    }
    check_structure(std::slice::from_ref(&node), None)?;

    let existing: HashSet<NodeId> = tree.node_ids().into_iter().collect();
    let mut incoming = HashSet::new();
    for id in node.subtree_ids() {
        if existing.contains(&id) || !incoming.insert(id) {
            return Err(DomainError::DuplicateId(id));
        }
    }

    let mut next = tree.clone();
    let siblings = next
        .child_list_mut(parent)
        .ok_or_else(|| parent_not_found(parent))?;
    let index = index.min(siblings.len());
    debug!("insert {} at index {}", node.kind_name(), index);
    siblings.insert(index, node);
    Ok(next)
}

/// Relocate `id` (with its subtree) to child `index` of `new_parent`.
///
/// `index` addresses the destination list after the node has been taken out
/// and is clamped to its length. Moving a node onto its current position
/// returns the input tree unchanged.
#[instrument(level = "debug", skip(tree))]
pub fn move_node<'a>(
    tree: &'a Template,
    id: &NodeId,
    new_parent: Option<&NodeId>,
    index: usize,
) -> DomainResult<Cow<'a, Template>> {
    let source = tree.locate(id).ok_or(DomainError::NotFound(*id))?;
    let node = tree.find(id).ok_or(DomainError::NotFound(*id))?;
    if node.is_column() {
        return Err(DomainError::ColumnPlacement(*id));
    }
    if let Some(parent) = new_parent {
        if parent == id || tree.is_descendant(id, parent) {
            return Err(DomainError::Cycle {
                node: *id,
                parent: *parent,
            });
        }
    }

    let destination_len = tree
        .child_list(new_parent)
        .ok_or_else(|| parent_not_found(new_parent))?
        .len();
    let same_parent = source.parent.as_ref() == new_parent;
    let len_after_removal = if same_parent {
        destination_len - 1
    } else {
        destination_len
    };
    let index = index.min(len_after_removal);

    if same_parent && index == source.index {
        debug!("move of {} is a no-op", id);
        return Ok(Cow::Borrowed(tree));
    }

    let mut next = tree.clone();
    let moved = next
        .child_list_mut(source.parent.as_ref())
        .map(|siblings| siblings.remove(source.index))
        .ok_or(DomainError::NotFound(*id))?;
    next.child_list_mut(new_parent)
        .ok_or_else(|| parent_not_found(new_parent))?
        .insert(index, moved);
    debug!(
        "moved {} from {:?}[{}] to {:?}[{}]",
        id, source.parent, source.index, new_parent, index
    );
    Ok(Cow::Owned(next))
}

/// Delete `id` and its subtree. Absent ids are a no-op.
///
/// A `column` is never removed on its own: that would change the arity of
/// its layout.
#[instrument(level = "debug", skip(tree))]
pub fn remove<'a>(tree: &'a Template, id: &NodeId) -> Cow<'a, Template> {
    let Some(location) = tree.locate(id) else {
        return Cow::Borrowed(tree);
    };
    if tree.find(id).is_some_and(Node::is_column) {
        warn!("refusing to remove column {} from its layout", id);
        return Cow::Borrowed(tree);
    }

    let mut next = tree.clone();
    match next.child_list_mut(location.parent.as_ref()) {
        Some(siblings) => {
            siblings.remove(location.index);
            Cow::Owned(next)
        }
        None => Cow::Borrowed(tree),
    }
}

/// Deep-copy `id` with fresh ids and place the copy right after the original.
///
/// Returns `None` when `id` is absent.
#[instrument(level = "debug", skip(tree))]
pub fn duplicate(tree: &Template, id: &NodeId) -> DomainResult<Option<Duplicated>> {
    let (Some(location), Some(original)) = (tree.locate(id), tree.find(id)) else {
        return Ok(None);
    };
    if original.is_column() {
        return Err(DomainError::ColumnPlacement(*id));
    }
    // children of unsupported elements are kept verbatim, never resized
    if tree.child_list(location.parent.as_ref()).is_none() {
        return Ok(None);
    }

    let copy = original.fresh_copy();
    let copy_id = *copy.id();
    let next = insert(tree, copy, location.parent.as_ref(), location.index + 1)?;
    Ok(Some(Duplicated {
        tree: next,
        id: copy_id,
    }))
}

/// Shallow-merge `patch` into node `id`.
///
/// Unknown ids and patches that leave the node as it was are a no-op.
#[instrument(level = "debug", skip(tree, patch))]
pub fn update<'a>(tree: &'a Template, id: &NodeId, patch: &NodePatch) -> Cow<'a, Template> {
    let Some(original) = tree.find(id) else {
        return Cow::Borrowed(tree);
    };
    let mut patched = original.clone();
    patched.apply_patch(patch);
    if patched == *original {
        return Cow::Borrowed(tree);
    }
    let mut next = tree.clone();
    if let Some(node) = next.find_mut(id) {
        *node = patched;
    }
    Cow::Owned(next)
}

fn parent_not_found(parent: Option<&NodeId>) -> DomainError {
    match parent {
        Some(id) => DomainError::ParentNotFound(*id),
        // the root list always exists
        None => DomainError::Malformed("template root is unavailable".to_string()),
    }
}
