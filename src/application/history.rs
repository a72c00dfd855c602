//! Snapshot-based undo/redo log.

use std::collections::VecDeque;
use std::mem;

use tracing::{debug, trace};

use crate::domain::Template;

/// Default number of snapshots kept, current state included.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Linear, single-branch log of whole-tree snapshots.
///
/// The log is `past + present + future`. A commit discards the future and,
/// when the log is full, evicts the oldest past entry.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Template>,
    present: Template,
    future: Vec<Template>,
    capacity: usize,
}

impl History {
    pub fn new(initial: Template) -> Self {
        Self::with_capacity(initial, DEFAULT_HISTORY_CAPACITY)
    }

    /// A capacity of zero is treated as one: the log always holds the present.
    pub fn with_capacity(initial: Template, capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn current(&self) -> &Template {
        &self.present
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.past.len() + 1 + self.future.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Position of the present snapshot within the log.
    pub fn cursor(&self) -> usize {
        self.past.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Record `tree` as the new head; redo entries are invalidated.
    pub fn commit(&mut self, tree: &Template) {
        if !self.future.is_empty() {
            debug!("commit discards {} redo entries", self.future.len());
            self.future.clear();
        }
        let previous = mem::replace(&mut self.present, tree.clone());
        self.past.push_back(previous);
        while self.past.len() + 1 > self.capacity {
            self.past.pop_front();
            trace!("history full, evicted oldest snapshot");
        }
    }

    /// Step back one snapshot. At the oldest entry this is a no-op.
    pub fn undo(&mut self) -> &Template {
        if let Some(previous) = self.past.pop_back() {
            let current = mem::replace(&mut self.present, previous);
            self.future.push(current);
        }
        &self.present
    }

    /// Step forward one snapshot. At the newest entry this is a no-op.
    pub fn redo(&mut self) -> &Template {
        if let Some(next) = self.future.pop() {
            let current = mem::replace(&mut self.present, next);
            self.past.push_back(current);
        }
        &self.present
    }

    /// Drop all entries and start over from `tree`.
    pub fn reset(&mut self, tree: Template) {
        self.past.clear();
        self.future.clear();
        self.present = tree;
    }
}
