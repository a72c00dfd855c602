//! Editor service: the single object UI code talks to.
//!
//! Owns the current template, the selection, the undo/redo log and the drag
//! engine. Every structural change goes through the pure mutator and is
//! recorded as one history snapshot; hover ticks and live property previews
//! are not.

use std::borrow::Cow;

use tracing::{debug, info, instrument, warn};

use crate::application::drag::{
    CancelReason, DragEngine, DragSource, DragState, DropAction, DropSlot, HoverTarget, Point,
    Rect,
};
use crate::application::history::{History, DEFAULT_HISTORY_CAPACITY};
use crate::application::services::render::HtmlRenderer;
use crate::application::ApplicationResult;
use crate::domain::{mutator, DomainError, Node, NodeId, NodePatch, PaletteItem, Template};

/// Result of finishing a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Inserted(NodeId),
    Moved(NodeId),
    Unchanged,
    Cancelled(CancelReason),
}

pub struct EditorService {
    document: Template,
    selection: Option<NodeId>,
    history: History,
    drag: DragEngine,
    revision: u64,
}

impl Default for EditorService {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EditorService {
    pub fn new(history_capacity: usize) -> Self {
        Self::with_template(Template::new(), history_capacity)
    }

    pub fn with_template(template: Template, history_capacity: usize) -> Self {
        Self {
            history: History::with_capacity(template.clone(), history_capacity),
            document: template,
            selection: None,
            drag: DragEngine::new(),
            revision: 0,
        }
    }

    pub fn template(&self) -> &Template {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Incremented on every published state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Live edits not yet recorded in history.
    pub fn is_dirty(&self) -> bool {
        self.document != *self.history.current()
    }

    /// Replace the document and reset history to a single entry.
    #[instrument(level = "info", skip_all, fields(nodes = template.node_count()))]
    pub fn load_template(&mut self, template: Template) {
        self.history.reset(template.clone());
        self.document = template;
        self.selection = None;
        self.drag.reset();
        self.publish();
        info!("template loaded");
    }

    // ------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------

    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.as_ref()
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selection.as_ref().and_then(|id| self.document.find(id))
    }

    /// Select a node, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<NodeId>) -> ApplicationResult<()> {
        match id {
            Some(id) if !self.document.contains(&id) => {
                self.selection = None;
                self.publish();
                Err(DomainError::NotFound(id).into())
            }
            id => {
                self.selection = id;
                self.publish();
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------

    /// Instantiate a palette entry at `index` of `parent` (root when `None`).
    #[instrument(level = "debug", skip(self))]
    pub fn add_element(
        &mut self,
        item: PaletteItem,
        parent: Option<&NodeId>,
        index: usize,
    ) -> ApplicationResult<NodeId> {
        let node = item.instantiate()?;
        let id = *node.id();
        let next = mutator::insert(&self.document, node, parent, index)?;
        self.apply(next);
        Ok(id)
    }

    /// Like [`add_element`](Self::add_element) with a palette name.
    pub fn add_element_named(
        &mut self,
        name: &str,
        parent: Option<&NodeId>,
        index: usize,
    ) -> ApplicationResult<NodeId> {
        let item = name.parse::<PaletteItem>()?;
        self.add_element(item, parent, index)
    }

    /// Apply a property edit and record it. Returns whether the node changed.
    pub fn update_element(&mut self, id: &NodeId, patch: &NodePatch) -> bool {
        match owned(mutator::update(&self.document, id, patch)) {
            Some(next) => {
                self.apply(next);
                true
            }
            None => false,
        }
    }

    /// Apply a property edit live, without a history entry. Returns whether the
    /// node changed.
    pub fn preview_element(&mut self, id: &NodeId, patch: &NodePatch) -> bool {
        match owned(mutator::update(&self.document, id, patch)) {
            Some(next) => {
                self.document = next;
                self.publish();
                true
            }
            None => false,
        }
    }

    /// Record pending live edits. Returns false when there was nothing to record.
    pub fn commit_edits(&mut self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        self.history.commit(&self.document);
        self.publish();
        true
    }

    /// Delete a node and its subtree. Absent ids are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_element(&mut self, id: &NodeId) -> bool {
        match owned(mutator::remove(&self.document, id)) {
            Some(next) => {
                self.apply(next);
                true
            }
            None => false,
        }
    }

    /// Duplicate a node right after itself. Returns the id of the copy.
    #[instrument(level = "debug", skip(self))]
    pub fn duplicate_element(&mut self, id: &NodeId) -> ApplicationResult<Option<NodeId>> {
        match mutator::duplicate(&self.document, id)? {
            Some(duplicated) => {
                self.apply(duplicated.tree);
                Ok(Some(duplicated.id))
            }
            None => Ok(None),
        }
    }

    /// Move a node. Returns false when it already sits at the destination.
    #[instrument(level = "debug", skip(self))]
    pub fn move_element(
        &mut self,
        id: &NodeId,
        parent: Option<&NodeId>,
        index: usize,
    ) -> ApplicationResult<bool> {
        match owned(mutator::move_node(&self.document, id, parent, index)?) {
            Some(next) => {
                self.apply(next);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.is_dirty()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo() && !self.is_dirty()
    }

    /// Undo the last recorded change. Pending live edits are discarded first.
    pub fn undo(&mut self) -> bool {
        if self.is_dirty() {
            debug!("undo discards pending edits");
            self.restore(self.history.current().clone());
            return true;
        }
        if !self.history.can_undo() {
            return false;
        }
        let snapshot = self.history.undo().clone();
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        let snapshot = self.history.redo().clone();
        self.restore(snapshot);
        true
    }

    // ------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn begin_drag(&mut self, source: DragSource) -> ApplicationResult<()> {
        self.drag.begin(&self.document, source)
    }

    pub fn begin_drag_node(&mut self, id: &NodeId) -> ApplicationResult<()> {
        let source = DragSource::node(&self.document, id)?;
        self.drag.begin(&self.document, source)
    }

    /// Hover tick. Computes a candidate only; the tree is untouched.
    pub fn drag_over(&mut self, target: HoverTarget, pointer: Point, bounds: Rect) -> Option<DropSlot> {
        self.drag.hover(&self.document, target, pointer, bounds)
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel()
    }

    /// Release the pointer: apply the resolved drop and record it.
    ///
    /// A drop the tree refuses leaves the document untouched, marks the drag
    /// cancelled and returns the error.
    #[instrument(level = "debug", skip(self))]
    pub fn drop_drag(&mut self) -> ApplicationResult<DropOutcome> {
        let outcome = match self.drag.release(&self.document) {
            DropAction::Insert {
                item,
                parent,
                index,
            } => self
                .add_element(item, parent.as_ref(), index)
                .map(DropOutcome::Inserted),
            DropAction::Move { id, parent, index } => self
                .move_element(&id, parent.as_ref(), index)
                .map(|moved| match moved {
                    true => DropOutcome::Moved(id),
                    false => DropOutcome::Unchanged,
                }),
            DropAction::Unchanged { .. } => Ok(DropOutcome::Unchanged),
            DropAction::Cancelled(reason) => Ok(DropOutcome::Cancelled(reason)),
        };
        if let Err(e) = &outcome {
            warn!("drop failed: {}", e);
            self.drag.reject();
        }
        outcome
    }

    // ------------------------------------------------------------
    // Export
    // ------------------------------------------------------------

    pub fn export_html(&self, renderer: &HtmlRenderer) -> String {
        renderer.render_document(&self.document)
    }

    fn apply(&mut self, next: Template) {
        self.document = next;
        self.history.commit(&self.document);
        self.revalidate_selection();
        self.publish();
    }

    fn restore(&mut self, snapshot: Template) {
        self.document = snapshot;
        self.revalidate_selection();
        self.publish();
    }

    fn revalidate_selection(&mut self) {
        if let Some(id) = self.selection {
            if !self.document.contains(&id) {
                debug!("selection {} no longer exists", id);
                self.selection = None;
            }
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
    }
}

fn owned(tree: Cow<'_, Template>) -> Option<Template> {
    match tree {
        Cow::Owned(next) => Some(next),
        Cow::Borrowed(_) => None,
    }
}
