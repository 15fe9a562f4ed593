//! Dependency resolution against the loaded task set.
//!
//! References in `blocked_by`/`blocks` are raw task identifiers. Each one is
//! either resolved to a loaded task or kept as an unresolved identifier,
//! which the inspector shows as "not in scope". Resolution is a single
//! lookup per reference, so cycles in the source data cannot cause
//! non-termination.

use serde::Serialize;

use crate::task::{Task, TaskStore};

/// Which side of the selection a task sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Blocks the selection (listed in its `blocked_by`).
    Upstream,
    /// Blocked by the selection (listed in its `blocks`).
    Downstream,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependencies<'a> {
    pub upstream: Vec<&'a Task>,
    pub unresolved_upstream: Vec<String>,
    pub downstream: Vec<&'a Task>,
    pub unresolved_downstream: Vec<String>,
}

impl<'a> Dependencies<'a> {
    /// True when the dependency panel should be omitted.
    pub fn is_empty(&self) -> bool {
        self.upstream.is_empty()
            && self.unresolved_upstream.is_empty()
            && self.downstream.is_empty()
            && self.unresolved_downstream.is_empty()
    }

    /// Flattened panel entries in display order: upstream first, then
    /// downstream; resolved before unresolved within each side.
    pub fn entries(&self) -> Vec<DependencyEntry<'a>> {
        let mut entries = Vec::new();
        entries.extend(
            self.upstream
                .iter()
                .map(|task| DependencyEntry::resolved(Direction::Upstream, task)),
        );
        entries.extend(
            self.unresolved_upstream
                .iter()
                .map(|id| DependencyEntry::unresolved(Direction::Upstream, id)),
        );
        entries.extend(
            self.downstream
                .iter()
                .map(|task| DependencyEntry::resolved(Direction::Downstream, task)),
        );
        entries.extend(
            self.unresolved_downstream
                .iter()
                .map(|id| DependencyEntry::unresolved(Direction::Downstream, id)),
        );
        entries
    }
}

/// One row of the dependency panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyEntry<'a> {
    pub direction: Direction,
    pub id: String,
    pub task: Option<&'a Task>,
}

impl<'a> DependencyEntry<'a> {
    fn resolved(direction: Direction, task: &'a Task) -> Self {
        Self {
            direction,
            id: task.id.clone(),
            task: Some(task),
        }
    }

    fn unresolved(direction: Direction, id: &str) -> Self {
        Self {
            direction,
            id: id.to_string(),
            task: None,
        }
    }

    pub fn in_scope(&self) -> bool {
        self.task.is_some()
    }
}

/// Partition a task's references into resolved tasks and unresolved ids.
pub fn resolve<'a>(task: &Task, store: &'a TaskStore) -> Dependencies<'a> {
    let (upstream, unresolved_upstream) = partition(&task.blocked_by, store);
    let (downstream, unresolved_downstream) = partition(&task.blocks, store);
    Dependencies {
        upstream,
        unresolved_upstream,
        downstream,
        unresolved_downstream,
    }
}

fn partition<'a>(ids: &[String], store: &'a TaskStore) -> (Vec<&'a Task>, Vec<String>) {
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();
    for id in ids {
        match store.find_by_task_id(id) {
            Some(task) => resolved.push(task),
            None => unresolved.push(id.clone()),
        }
    }
    (resolved, unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::with_deps;

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|task| task.id.clone()).collect()
    }

    #[test]
    fn resolves_loaded_and_keeps_missing_as_unresolved() {
        let store = TaskStore::from_tasks(vec![
            with_deps("1", &[], &["2"]),
            with_deps("2", &["1"], &[]),
            with_deps("3", &["9"], &[]),
        ]);

        let c = store.find_by_task_id("3").expect("task");
        let deps = resolve(c, &store);
        assert!(deps.upstream.is_empty());
        assert_eq!(deps.unresolved_upstream, vec!["9".to_string()]);
        assert!(!deps.is_empty());

        let a = store.find_by_task_id("1").expect("task");
        let deps = resolve(a, &store);
        assert_eq!(ids(&deps.downstream), vec!["2"]);
        assert!(deps.unresolved_downstream.is_empty());
    }

    #[test]
    fn missing_reference_never_lands_in_resolved() {
        let store = TaskStore::from_tasks(vec![
            with_deps("1", &["2", "x", "y"], &[]),
            with_deps("2", &[], &["1"]),
        ]);
        let task = store.find_by_task_id("1").expect("task");
        let deps = resolve(task, &store);
        for id in &task.blocked_by {
            let loaded = store.find_by_task_id(id).is_some();
            assert_eq!(deps.unresolved_upstream.contains(id), !loaded);
            assert_eq!(deps.upstream.iter().any(|task| &task.id == id), loaded);
        }
    }

    #[test]
    fn no_references_means_empty_panel() {
        let store = TaskStore::from_tasks(vec![with_deps("1", &[], &[])]);
        let task = store.find_by_task_id("1").expect("task");
        assert!(resolve(task, &store).is_empty());
        assert!(resolve(task, &store).entries().is_empty());
    }

    #[test]
    fn cycles_resolve_both_ways_without_looping() {
        let store = TaskStore::from_tasks(vec![
            with_deps("1", &["2"], &["2"]),
            with_deps("2", &["1"], &["1"]),
        ]);
        let a = store.find_by_task_id("1").expect("task");
        let deps = resolve(a, &store);
        assert_eq!(ids(&deps.upstream), vec!["2"]);
        assert_eq!(ids(&deps.downstream), vec!["2"]);
    }

    #[test]
    fn entries_order_upstream_before_downstream() {
        let store = TaskStore::from_tasks(vec![
            with_deps("1", &["2", "8"], &["3", "9"]),
            with_deps("2", &[], &[]),
            with_deps("3", &[], &[]),
        ]);
        let task = store.find_by_task_id("1").expect("task");
        let deps = resolve(task, &store);
        let entries: Vec<(Direction, String, bool)> = deps
            .entries()
            .into_iter()
            .map(|entry| (entry.direction, entry.id.clone(), entry.in_scope()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (Direction::Upstream, "2".to_string(), true),
                (Direction::Upstream, "8".to_string(), false),
                (Direction::Downstream, "3".to_string(), true),
                (Direction::Downstream, "9".to_string(), false),
            ]
        );
    }
}
