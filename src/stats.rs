//! Aggregate task counters. Display-only; nothing in the dependency logic
//! reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskStatus, TaskStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    #[serde(default)]
    pub pending_count: u64,
    #[serde(default)]
    pub in_progress_count: u64,
    #[serde(default)]
    pub available_count: u64,
    #[serde(default)]
    pub blocked_count: u64,
    #[serde(default)]
    pub completed_count: u64,
    #[serde(default)]
    pub completed_today: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTaskStats {
    pub agent_id: String,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub pending_count: u64,
    #[serde(default)]
    pub in_progress_count: u64,
    #[serde(default)]
    pub blocked_count: u64,
    #[serde(default)]
    pub completed_today: u64,
}

impl TaskStats {
    /// One-line footer summary.
    pub fn summary(&self) -> String {
        format!(
            "pending: {}  ready: {}  blocked: {}  in progress: {}  done: {} ({} today)",
            self.pending_count,
            self.available_count,
            self.blocked_count,
            self.in_progress_count,
            self.completed_count,
            self.completed_today
        )
    }
}

/// A pending task is blocked while any loaded upstream task is unfinished.
/// References outside the loaded set do not block.
pub fn is_blocked(task: &Task, store: &TaskStore) -> bool {
    task.status == TaskStatus::Pending
        && task.blocked_by.iter().any(|id| {
            store
                .find_by_task_id(id)
                .map(|upstream| upstream.status != TaskStatus::Completed)
                .unwrap_or(false)
        })
}

fn completed_on_day(task: &Task, now: DateTime<Utc>) -> bool {
    task.status == TaskStatus::Completed
        && task
            .completed_at
            .map(|at| at.date_naive() == now.date_naive())
            .unwrap_or(false)
}

pub fn compute<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    store: &TaskStore,
    now: DateTime<Utc>,
) -> TaskStats {
    let mut stats = TaskStats::default();
    for task in tasks {
        match task.status {
            TaskStatus::Pending => {
                stats.pending_count += 1;
                if is_blocked(task, store) {
                    stats.blocked_count += 1;
                } else {
                    stats.available_count += 1;
                }
            }
            TaskStatus::InProgress => stats.in_progress_count += 1,
            TaskStatus::Completed => {
                stats.completed_count += 1;
                if completed_on_day(task, now) {
                    stats.completed_today += 1;
                }
            }
            TaskStatus::Deleted | TaskStatus::Other(_) => {}
        }
    }
    stats
}

/// Per-agent rows in first-seen order; tasks without an agent are skipped.
pub fn compute_by_agent(store: &TaskStore, now: DateTime<Utc>) -> Vec<AgentTaskStats> {
    let mut rows: Vec<AgentTaskStats> = Vec::new();
    for task in store.iter() {
        let Some(agent_id) = task.agent() else {
            continue;
        };
        let idx = match rows.iter().position(|row| row.agent_id == agent_id) {
            Some(idx) => idx,
            None => {
                rows.push(AgentTaskStats {
                    agent_id: agent_id.to_string(),
                    agent_name: task
                        .agent_name
                        .clone()
                        .unwrap_or_else(|| agent_id.to_string()),
                    ..AgentTaskStats::default()
                });
                rows.len() - 1
            }
        };
        let row = &mut rows[idx];
        match task.status {
            TaskStatus::Pending => {
                row.pending_count += 1;
                if is_blocked(task, store) {
                    row.blocked_count += 1;
                }
            }
            TaskStatus::InProgress => row.in_progress_count += 1,
            _ => {
                if completed_on_day(task, now) {
                    row.completed_today += 1;
                }
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{task, with_deps};
    use crate::task::parse_timestamp;

    fn now() -> DateTime<Utc> {
        parse_timestamp("2025-03-04T15:00:00Z").expect("timestamp")
    }

    #[test]
    fn pending_split_into_ready_and_blocked() {
        let mut done = task("1", "completed");
        done.completed_at = parse_timestamp("2025-03-04T09:00:00Z");
        let mut old = task("5", "completed");
        old.completed_at = parse_timestamp("2025-03-03T23:59:00Z");
        let tasks = vec![
            done,
            with_deps("2", &["1"], &[]),
            with_deps("3", &["4"], &[]),
            task("4", "in_progress"),
            old,
            with_deps("6", &["missing"], &[]),
            task("7", "deleted"),
        ];
        let store = TaskStore::from_tasks(tasks);
        let stats = compute(store.iter(), &store, now());
        assert_eq!(
            stats,
            TaskStats {
                pending_count: 3,
                in_progress_count: 1,
                available_count: 2,
                blocked_count: 1,
                completed_count: 2,
                completed_today: 1,
            }
        );
    }

    #[test]
    fn agent_rows_group_in_first_seen_order() {
        let mut a1 = task("1", "pending");
        a1.agent_id = Some("b".to_string());
        a1.agent_name = Some("Bee".to_string());
        let mut a2 = task("2", "in_progress");
        a2.agent_id = Some("a".to_string());
        let mut a3 = task("3", "completed");
        a3.agent_id = Some("b".to_string());
        a3.completed_at = Some(now());
        let store = TaskStore::from_tasks(vec![a1, a2, a3, task("4", "pending")]);

        let rows = compute_by_agent(&store, now());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].agent_id, "b");
        assert_eq!(rows[0].agent_name, "Bee");
        assert_eq!(rows[0].pending_count, 1);
        assert_eq!(rows[0].completed_today, 1);
        assert_eq!(rows[1].agent_id, "a");
        assert_eq!(rows[1].in_progress_count, 1);
    }

    #[test]
    fn stats_deserialize_with_missing_counters() {
        let stats: TaskStats = serde_json::from_str(r#"{"pending_count": 4}"#).expect("stats");
        assert_eq!(stats.pending_count, 4);
        assert_eq!(stats.completed_today, 0);
    }
}
