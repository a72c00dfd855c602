//! Drag engine: resolves pointer positions over rendered nodes into drop slots.
//!
//! ```text
//! Idle -> Dragging -> (Hovering)* -> Dropped
//!                 \-----------------> Cancelled
//! ```
//!
//! Hover ticks only compute a candidate slot; nothing touches the tree until
//! `release`, which hands a [`DropAction`] to the caller.

use std::mem;

use tracing::{debug, instrument, trace, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, NodeId, PaletteItem, Template};

/// Pointer position in canvas coordinates; `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of a rendered element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Which side of a hovered sibling the drop lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Before,
    After,
}

impl Edge {
    /// Upper half is `Before`; the midpoint itself counts as the lower half.
    pub fn for_pointer(pointer: Point, bounds: Rect) -> Self {
        if pointer.y < bounds.mid_y() {
            Edge::Before
        } else {
            Edge::After
        }
    }
}

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    /// A palette entry to instantiate on drop.
    Palette(PaletteItem),
    /// An existing node and where it currently sits.
    Node {
        id: NodeId,
        parent: Option<NodeId>,
        index: usize,
    },
}

impl DragSource {
    /// Source payload for an existing node, located in `tree`.
    pub fn node(tree: &Template, id: &NodeId) -> ApplicationResult<Self> {
        let location = tree.locate(id).ok_or(DomainError::NotFound(*id))?;
        if tree.find(id).is_some_and(|node| node.is_column()) {
            return Err(DomainError::ColumnPlacement(*id).into());
        }
        Ok(DragSource::Node {
            id: *id,
            parent: location.parent,
            index: location.index,
        })
    }
}

/// Element under the pointer, as reported by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    /// Empty canvas area: append to the root.
    Canvas,
    /// Interior of a container: append to it.
    Container(NodeId),
    /// A sibling used as position marker.
    Node(NodeId),
}

/// Candidate insertion point. `slot` counts gaps in the destination list as it
/// is now, before a dragged node is taken out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropSlot {
    pub parent: Option<NodeId>,
    pub slot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Released outside any valid target.
    NoTarget,
    /// Explicit cancel, e.g. escape.
    Aborted,
    /// The tree refused the drop.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
    },
    Hovering {
        source: DragSource,
        candidate: DropSlot,
    },
    Dropped {
        source: DragSource,
        candidate: DropSlot,
    },
    Cancelled {
        source: DragSource,
        reason: CancelReason,
    },
}

/// Mutation requested by a completed drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    Insert {
        item: PaletteItem,
        parent: Option<NodeId>,
        index: usize,
    },
    /// `index` addresses the destination list after the node was taken out.
    Move {
        id: NodeId,
        parent: Option<NodeId>,
        index: usize,
    },
    /// Dropped onto its own position.
    Unchanged { id: NodeId },
    Cancelled(CancelReason),
}

#[derive(Debug, Clone, Default)]
pub struct DragEngine {
    state: DragState,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Whether a drag is in progress (Dragging or Hovering).
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            DragState::Dragging { .. } | DragState::Hovering { .. }
        )
    }

    pub fn source(&self) -> Option<&DragSource> {
        match &self.state {
            DragState::Dragging { source } | DragState::Hovering { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn candidate(&self) -> Option<&DropSlot> {
        match &self.state {
            DragState::Hovering { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    /// Start a drag. Node sources are re-located in `tree`.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn begin(&mut self, tree: &Template, source: DragSource) -> ApplicationResult<()> {
        if self.is_active() {
            return Err(ApplicationError::InvalidDrag(
                "a drag is already in progress".to_string(),
            ));
        }
        let source = match source {
            DragSource::Node { id, .. } => DragSource::node(tree, &id)?,
            palette => palette,
        };
        self.state = DragState::Dragging { source };
        Ok(())
    }

    /// Hover tick: compute the candidate slot for the pointer over `target`.
    ///
    /// Invalid targets clear the candidate. Returns the current candidate.
    pub fn hover(
        &mut self,
        tree: &Template,
        target: HoverTarget,
        pointer: Point,
        bounds: Rect,
    ) -> Option<DropSlot> {
        let source = relocate(tree, *self.source()?);
        let candidate = resolve_slot(tree, &source, target, pointer, bounds);
        trace!(?target, ?candidate, "hover");
        self.state = match candidate {
            Some(candidate) => DragState::Hovering { source, candidate },
            None => DragState::Dragging { source },
        };
        candidate
    }

    /// Pointer left every drop target.
    pub fn leave(&mut self) {
        if let DragState::Hovering { source, .. } = self.state {
            self.state = DragState::Dragging { source };
        }
    }

    /// Finish the drag and report what should happen to `tree`.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn release(&mut self, tree: &Template) -> DropAction {
        match mem::take(&mut self.state) {
            DragState::Hovering { source, candidate } => {
                let source = relocate(tree, source);
                self.state = DragState::Dropped { source, candidate };
                let action = action_for(source, candidate);
                debug!(?action, "drop");
                action
            }
            DragState::Dragging { source } => {
                self.state = DragState::Cancelled {
                    source,
                    reason: CancelReason::NoTarget,
                };
                DropAction::Cancelled(CancelReason::NoTarget)
            }
            finished => {
                self.state = finished;
                DropAction::Cancelled(CancelReason::NoTarget)
            }
        }
    }

    /// Abort the drag. Returns false when no drag was active.
    pub fn cancel(&mut self) -> bool {
        self.finish_cancelled(CancelReason::Aborted)
    }

    /// Mark a released drag as refused by the tree.
    pub(crate) fn reject(&mut self) {
        if let DragState::Dropped { source, .. } = self.state {
            warn!(?source, "drop rejected");
            self.state = DragState::Cancelled {
                source,
                reason: CancelReason::Rejected,
            };
        }
    }

    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    fn finish_cancelled(&mut self, reason: CancelReason) -> bool {
        match self.source() {
            Some(&source) => {
                debug!(?reason, "drag cancelled");
                self.state = DragState::Cancelled { source, reason };
                true
            }
            None => false,
        }
    }
}

/// Refresh a node source's position; the tree may have changed since `begin`.
/// A node that is gone keeps its last position and fails when applied.
fn relocate(tree: &Template, source: DragSource) -> DragSource {
    match source {
        DragSource::Node { id, .. } => match tree.locate(&id) {
            Some(location) => DragSource::Node {
                id,
                parent: location.parent,
                index: location.index,
            },
            None => source,
        },
        palette => palette,
    }
}

fn resolve_slot(
    tree: &Template,
    source: &DragSource,
    target: HoverTarget,
    pointer: Point,
    bounds: Rect,
) -> Option<DropSlot> {
    let candidate = match target {
        HoverTarget::Canvas => DropSlot {
            parent: None,
            slot: tree.children().len(),
        },
        HoverTarget::Container(id) => DropSlot {
            parent: Some(id),
            slot: tree.child_list(Some(&id))?.len(),
        },
        HoverTarget::Node(id) => {
            let location = tree.locate(&id)?;
            // markers inside a columns layout (its columns) are not droppable
            tree.child_list(location.parent.as_ref())?;
            let slot = match Edge::for_pointer(pointer, bounds) {
                Edge::Before => location.index,
                Edge::After => location.index + 1,
            };
            DropSlot {
                parent: location.parent,
                slot,
            }
        }
    };

    if let (DragSource::Node { id, .. }, Some(parent)) = (source, candidate.parent.as_ref()) {
        if parent == id || tree.is_descendant(id, parent) {
            return None;
        }
    }
    Some(candidate)
}

fn action_for(source: DragSource, candidate: DropSlot) -> DropAction {
    match source {
        DragSource::Palette(item) => DropAction::Insert {
            item,
            parent: candidate.parent,
            index: candidate.slot,
        },
        DragSource::Node { id, parent, index } => {
            let same_parent = parent == candidate.parent;
            if same_parent && (candidate.slot == index || candidate.slot == index + 1) {
                return DropAction::Unchanged { id };
            }
            let index = if same_parent && candidate.slot > index {
                candidate.slot - 1
            } else {
                candidate.slot
            };
            DropAction::Move {
                id,
                parent: candidate.parent,
                index,
            }
        }
    }
}
