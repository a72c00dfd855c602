//! Template document: the implicit root and tree-wide queries.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Content, Node, NodeId};
use crate::domain::palette::{MAX_COLUMNS, MIN_COLUMNS};

/// Current persisted format version.
pub const FORMAT_VERSION: u32 = 1;

/// The document tree. Its root is implicit: `children` is the top-level
/// sequence shown on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    version: u32,
    children: Vec<Node>,
}

/// Where a node sits: parent (`None` for the root) and child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub parent: Option<NodeId>,
    pub index: usize,
}

/// One step of a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a Node,
    pub parent: Option<NodeId>,
    pub index: usize,
    pub depth: usize,
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl Template {
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
            children: Vec::new(),
        }
    }

    /// Build a template from top-level nodes, validating the tree.
    pub fn with_children(children: Vec<Node>) -> DomainResult<Self> {
        let template = Self {
            version: FORMAT_VERSION,
            children,
        };
        template.validate()?;
        Ok(template)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> TemplateIter<'_> {
        TemplateIter::new(self)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.iter().map(|visit| *visit.node.id()).collect()
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.iter()
            .find(|visit| visit.node.id() == id)
            .map(|visit| visit.node)
    }

    pub(crate) fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        find_in_mut(&mut self.children, id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    pub fn locate(&self, id: &NodeId) -> Option<Location> {
        self.iter()
            .find(|visit| visit.node.id() == id)
            .map(|visit| Location {
                parent: visit.parent,
                index: visit.index,
            })
    }

    /// True if `id` lies strictly below `ancestor`.
    pub fn is_descendant(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        self.find(ancestor)
            .is_some_and(|node| node.children().iter().any(|child| child.contains(id)))
    }

    /// Resizable child list of the root (`None`) or of a drop-accepting container.
    pub fn child_list(&self, parent: Option<&NodeId>) -> Option<&[Node]> {
        match parent {
            None => Some(&self.children),
            Some(id) => self
                .find(id)
                .filter(|node| node.accepts_children())
                .map(|node| node.children()),
        }
    }

    pub(crate) fn child_list_mut(&mut self, parent: Option<&NodeId>) -> Option<&mut Vec<Node>> {
        match parent {
            None => Some(&mut self.children),
            Some(id) => self.find_mut(id).and_then(Node::container_mut),
        }
    }

    /// Check the tree invariants: unique ids, columns arity, column placement.
    pub fn validate(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for visit in self.iter() {
            if !seen.insert(*visit.node.id()) {
                return Err(DomainError::DuplicateId(*visit.node.id()));
            }
        }
        check_structure(&self.children, None)
    }

    /// Parse a persisted template, migrating the unversioned array shape.
    #[instrument(level = "debug", skip(json))]
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| DomainError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> DomainResult<Self> {
        let children = match value {
            Value::Array(_) => {
                debug!("migrating unversioned template to version {}", FORMAT_VERSION);
                parse_nodes(value)?
            }
            Value::Object(mut map) => {
                let version = match map.get("version") {
                    Some(v) => v
                        .as_u64()
                        .and_then(|v| u32::try_from(v).ok())
                        .ok_or_else(|| DomainError::Malformed(format!("invalid version: {}", v)))?,
                    None => 0,
                };
                if version > FORMAT_VERSION {
                    return Err(DomainError::UnsupportedVersion {
                        found: version,
                        supported: FORMAT_VERSION,
                    });
                }
                parse_nodes(map.remove("children").unwrap_or(Value::Array(Vec::new())))?
            }
            other => {
                return Err(DomainError::Malformed(format!(
                    "expected template object, got {}",
                    other
                )))
            }
        };
        Self::with_children(children)
    }

    pub fn to_json_pretty(&self) -> DomainResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::Malformed(e.to_string()))
    }
}

fn parse_nodes(value: Value) -> DomainResult<Vec<Node>> {
    serde_json::from_value(value).map_err(|e| DomainError::Malformed(e.to_string()))
}

fn find_in_mut<'a>(nodes: &'a mut [Node], id: &NodeId) -> Option<&'a mut Node> {
    for node in nodes.iter_mut() {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(node.children_slice_mut(), id) {
            return Some(found);
        }
    }
    None
}

/// Structural rules for a node list placed under `parent` (`None` for the root).
pub(crate) fn check_structure(nodes: &[Node], parent: Option<&Node>) -> DomainResult<()> {
    let parent_is_columns = matches!(parent.map(Node::content), Some(Content::Columns(_)));
    for node in nodes {
        if node.is_column() != parent_is_columns {
            return match node.is_column() {
                true => Err(DomainError::ColumnPlacement(*node.id())),
                false => Err(DomainError::Malformed(format!(
                    "columns layout holds non-column child {}",
                    node.id()
                ))),
            };
        }
        if let Content::Columns(columns) = node.content() {
            if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&columns.len()) {
                return Err(DomainError::InvalidColumnCount(columns.len()));
            }
        }
        check_structure(node.children(), Some(node))?;
    }
    Ok(())
}

/// Pre-order, left-to-right walk over every node.
pub struct TemplateIter<'a> {
    stack: Vec<Visit<'a>>,
}

impl<'a> TemplateIter<'a> {
    fn new(template: &'a Template) -> Self {
        let stack = template
            .children
            .iter()
            .enumerate()
            .rev()
            .map(|(index, node)| Visit {
                node,
                parent: None,
                index,
                depth: 0,
            })
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for TemplateIter<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for (index, child) in visit.node.children().iter().enumerate().rev() {
            self.stack.push(Visit {
                node: child,
                parent: Some(*visit.node.id()),
                index,
                depth: visit.depth + 1,
            });
        }
        Some(visit)
    }
}
