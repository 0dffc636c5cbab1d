//! Snapshot-based, linear undo/redo history over a [`FlowGraph`].
//!
//! The stack is only ever changed through [`History::save_state`],
//! [`History::undo`], [`History::redo`], [`History::jump_to_state`] and
//! [`History::clear_history`]. While a snapshot is being applied back onto the
//! live graph the history is flagged as restoring and refuses to record.

mod change;

pub use change::{EdgeChange, GraphChange};

use crate::model::FlowGraph;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Oldest snapshots are dropped beyond this many entries.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<FlowGraph>,
    index: Option<usize>,
    restoring: bool,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            snapshots: Vec::new(),
            index: None,
            restoring: false,
            max_entries: config.max_entries.max(1),
        }
    }

    /// Records a deep copy of `graph` as the newest state.
    ///
    /// Any redoable states past the cursor are discarded first. Returns `false`
    /// without recording while a restore is in progress.
    pub fn save_state(&mut self, graph: &FlowGraph) -> bool {
        if self.restoring {
            debug!("skipping history save while restoring");
            return false;
        }

        match self.index {
            Some(index) => self.snapshots.truncate(index + 1),
            None => self.snapshots.clear(),
        }
        self.snapshots.push(graph.clone());

        let excess = self.snapshots.len().saturating_sub(self.max_entries);
        if excess > 0 {
            self.snapshots.drain(..excess);
        }
        self.index = Some(self.snapshots.len() - 1);
        debug!(index = self.snapshots.len() - 1, "saved history state");
        true
    }

    /// Overwrites the entry under the cursor with `graph`.
    ///
    /// Folds edits that never warranted their own entry (resizes, unfinished
    /// drags) into the current state so stepping away and back keeps them.
    /// Returns `false` when nothing was recorded yet or a restore is running.
    pub fn amend_current(&mut self, graph: &FlowGraph) -> bool {
        if self.restoring {
            return false;
        }
        match self.index.and_then(|index| self.snapshots.get_mut(index)) {
            Some(snapshot) => {
                *snapshot = graph.clone();
                debug!(index = ?self.index, "amended current history state");
                true
            }
            None => false,
        }
    }

    /// Steps back one state. `None` when already at the oldest state.
    pub fn undo(&mut self) -> Option<&FlowGraph> {
        match self.index {
            Some(index) if index > 0 => {
                self.index = Some(index - 1);
                self.snapshots.get(index - 1)
            }
            _ => None,
        }
    }

    /// Steps forward one state. `None` when already at the newest state.
    pub fn redo(&mut self) -> Option<&FlowGraph> {
        match self.index {
            Some(index) if index + 1 < self.snapshots.len() => {
                self.index = Some(index + 1);
                self.snapshots.get(index + 1)
            }
            _ => None,
        }
    }

    /// Moves the cursor directly to `index`. Out of range is a no-op.
    pub fn jump_to_state(&mut self, index: usize) -> Option<&FlowGraph> {
        if index >= self.snapshots.len() {
            return None;
        }
        self.index = Some(index);
        self.snapshots.get(index)
    }

    pub fn clear_history(&mut self) {
        self.snapshots.clear();
        self.index = None;
    }

    pub fn current(&self) -> Option<&FlowGraph> {
        self.index.and_then(|index| self.snapshots.get(index))
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(index) if index > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.index, Some(index) if index + 1 < self.snapshots.len())
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// While set, [`History::save_state`] and [`History::amend_current`]
    /// record nothing. The session holds it across a restore, whose commit
    /// path would otherwise push the restored graph as a new entry.
    pub(crate) fn set_restoring(&mut self, restoring: bool) {
        self.restoring = restoring;
    }
}
