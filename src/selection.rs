//! Selection, highlighting and dependency navigation.
//!
//! The inspector panel is either closed or open on exactly one task. There
//! is no loading state: everything here works on already-loaded data.

use tracing::{debug, trace};

use crate::deps::Direction;
use crate::task::{Task, TaskStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelState {
    #[default]
    Closed,
    Open(Task),
}

impl PanelState {
    pub fn selected(&self) -> Option<&Task> {
        match self {
            PanelState::Closed => None,
            PanelState::Open(task) => Some(task),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PanelState::Open(_))
    }

    /// Open on `task`, or close when `task` is already selected.
    pub fn select(&mut self, task: &Task) {
        let same = self
            .selected()
            .map(|current| current.has_key(&task.key()))
            .unwrap_or(false);
        if same {
            trace!(task = %task.key(), "selection toggled closed");
            *self = PanelState::Closed;
        } else {
            trace!(task = %task.key(), "selection opened");
            *self = PanelState::Open(task.clone());
        }
    }

    pub fn clear(&mut self) {
        if self.is_open() {
            trace!("selection cleared");
        }
        *self = PanelState::Closed;
    }

    /// Jump to a dependency by raw task identifier.
    ///
    /// Returns `false` and leaves the state untouched when the identifier is
    /// not in the loaded set; out-of-page tasks are never fetched.
    pub fn navigate_to(&mut self, store: &TaskStore, task_id: &str) -> bool {
        let Some(target) = store.find_by_task_id(task_id) else {
            debug!(task_id, "navigation target not in scope");
            return false;
        };
        self.select(target);
        true
    }

    /// Relation of `candidate` to the current selection.
    pub fn highlight_for(&self, candidate: &Task) -> Option<Direction> {
        let selected = self.selected()?;
        if selected.blocked_by.iter().any(|id| *id == candidate.id) {
            Some(Direction::Upstream)
        } else if selected.blocks.iter().any(|id| *id == candidate.id) {
            Some(Direction::Downstream)
        } else {
            None
        }
    }

    /// Swap in the fresh record after a reload, or close if it vanished.
    pub fn refresh(&mut self, store: &TaskStore) {
        let Some(key) = self.selected().map(Task::key) else {
            return;
        };
        match store.get(&key) {
            Some(task) => *self = PanelState::Open(task.clone()),
            None => {
                debug!(task = %key, "selected task left the loaded set");
                *self = PanelState::Closed;
            }
        }
    }
}
