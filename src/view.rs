//! Page-level owner of the loaded tasks and the current selection.
//!
//! Presentation code reads through this type and reports intent (select,
//! clear, navigate); it never mutates the collection itself.

use crate::board::{self, Board, ListFilter};
use crate::deps::{self, Dependencies, Direction};
use crate::observe::{Observable, SubscriptionId};
use crate::selection::PanelState;
use crate::task::{Task, TaskKey, TaskStore};

#[derive(Debug, Default)]
pub struct TaskDependencyView {
    store: Observable<TaskStore>,
    panel: Observable<PanelState>,
}

impl TaskDependencyView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let mut view = Self::new();
        view.replace_tasks(tasks);
        view
    }

    pub fn store(&self) -> &TaskStore {
        self.store.get()
    }

    pub fn panel(&self) -> &PanelState {
        self.panel.get()
    }

    pub fn selected(&self) -> Option<&Task> {
        self.panel.get().selected()
    }

    pub fn subscribe_tasks(&mut self, listener: impl FnMut(&TaskStore) + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn subscribe_panel(
        &mut self,
        listener: impl FnMut(&PanelState) + 'static,
    ) -> SubscriptionId {
        self.panel.subscribe(listener)
    }

    /// Swap in a freshly fetched page. Last update wins; the selection
    /// follows its composite key into the new page or closes.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.store.set(TaskStore::from_tasks(tasks));
        let store = self.store.get();
        let mut next = self.panel.get().clone();
        next.refresh(store);
        if next != *self.panel.get() {
            self.panel.set(next);
        }
    }

    pub fn select(&mut self, task: &Task) {
        self.panel.update(|panel| panel.select(task));
    }

    /// Select by composite key; unknown keys are ignored.
    pub fn select_by_key(&mut self, key: &TaskKey) -> bool {
        let Some(task) = self.store.get().get(key).cloned() else {
            return false;
        };
        self.select(&task);
        true
    }

    pub fn clear(&mut self) {
        if self.panel.get().is_open() {
            self.panel.update(PanelState::clear);
        }
    }

    /// Move the selection along a dependency edge. No-op when the target is
    /// not in the loaded page.
    pub fn navigate_to(&mut self, task_id: &str) -> bool {
        let mut next = self.panel.get().clone();
        if !next.navigate_to(self.store.get(), task_id) {
            return false;
        }
        self.panel.set(next);
        true
    }

    pub fn highlight_for(&self, candidate: &Task) -> Option<Direction> {
        self.panel.get().highlight_for(candidate)
    }

    pub fn dependencies_of(&self, task: &Task) -> Dependencies<'_> {
        deps::resolve(task, self.store.get())
    }

    pub fn dependencies_of_selected(&self) -> Option<Dependencies<'_>> {
        self.selected().map(|task| self.dependencies_of(task))
    }

    pub fn board(&self) -> Board<'_> {
        board::group(self.store.get().iter())
    }

    pub fn list(&self, filter: &ListFilter) -> Vec<&Task> {
        board::filter(self.store.get().iter(), filter)
    }
}
