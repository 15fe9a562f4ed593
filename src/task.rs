//! Task records and the in-memory task store.
//!
//! Tasks are fetched from an external tracker and never written back. The
//! store keeps them in source order and indexes them by composite key
//! (`list_id/task_id`) and by bare task identifier, which is what
//! `blocked_by`/`blocks` references carry.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_DELETED: &str = "deleted";

/// Composite task identity: task identifiers are only unique within a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    pub list_id: String,
    pub task_id: String,
}

impl TaskKey {
    pub fn new(list_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            task_id: task_id.into(),
        }
    }

    /// Parse `list/task`; returns `None` for a bare identifier.
    pub fn parse(value: &str) -> Option<Self> {
        let (list_id, task_id) = value.trim().split_once('/')?;
        if list_id.is_empty() || task_id.is_empty() {
            return None;
        }
        Some(Self::new(list_id, task_id))
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.list_id, self.task_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Deleted,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => STATUS_PENDING,
            TaskStatus::InProgress => STATUS_IN_PROGRESS,
            TaskStatus::Completed => STATUS_COMPLETED,
            TaskStatus::Deleted => STATUS_DELETED,
            TaskStatus::Other(value) => value.as_str(),
        }
    }

    /// Statuses the viewer cycles through, in display order.
    pub fn known() -> [TaskStatus; 4] {
        [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Deleted,
        ]
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            STATUS_PENDING => TaskStatus::Pending,
            STATUS_IN_PROGRESS => TaskStatus::InProgress,
            STATUS_COMPLETED => TaskStatus::Completed,
            STATUS_DELETED => TaskStatus::Deleted,
            _ => TaskStatus::Other(value),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(value: &str) -> Self {
        TaskStatus::from(value.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "task_list_id")]
    pub list_id: String,
    #[serde(alias = "task_id")]
    pub id: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_form: Option<String>,
    #[serde(default)]
    pub blocked_by: Vec<String>,
    #[serde(default)]
    pub blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
}

impl Task {
    pub fn new(
        list_id: impl Into<String>,
        id: impl Into<String>,
        subject: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        Self {
            list_id: list_id.into(),
            id: id.into(),
            subject: subject.into(),
            description: None,
            status,
            owner: None,
            active_form: None,
            blocked_by: Vec::new(),
            blocks: Vec::new(),
            created_at: None,
            updated_at: None,
            started_at: None,
            completed_at: None,
            metadata: None,
            agent_id: None,
            agent_name: None,
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.list_id.clone(), self.id.clone())
    }

    pub fn has_key(&self, key: &TaskKey) -> bool {
        self.list_id == key.list_id && self.id == key.task_id
    }

    /// Present-tense activity label; only shown while the task is running.
    pub fn active_label(&self) -> Option<&str> {
        if self.status != TaskStatus::InProgress {
            return None;
        }
        self.active_form
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Agent identifier used by the agent filter, falling back to the label.
    pub fn agent(&self) -> Option<&str> {
        self.agent_id.as_deref().or(self.agent_name.as_deref())
    }

    /// Flattened metadata entries in key order.
    ///
    /// Returns `None` when metadata is absent, not valid JSON, or not a JSON
    /// object; callers omit the metadata section in that case.
    pub fn metadata_entries(&self) -> Option<Vec<(String, String)>> {
        let raw = self.metadata.as_deref()?;
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        let object = value.as_object()?;
        let mut entries: Vec<(String, String)> = object
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect();
        entries.sort_by(|left, right| left.0.cmp(&right.0));
        Some(entries)
    }
}

/// Lookup structure over one fetched page of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    by_key: HashMap<TaskKey, usize>,
    by_task_id: HashMap<String, usize>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the store; on a duplicate composite key the later record wins but
    /// keeps the position of the first occurrence.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = Self::new();
        for task in tasks {
            store.upsert(task);
        }
        store
    }

    fn upsert(&mut self, task: Task) {
        let key = task.key();
        if let Some(&idx) = self.by_key.get(&key) {
            self.tasks[idx] = task;
            return;
        }
        let idx = self.tasks.len();
        self.by_task_id.entry(task.id.clone()).or_insert(idx);
        self.by_key.insert(key, idx);
        self.tasks.push(task);
    }

    pub fn get(&self, key: &TaskKey) -> Option<&Task> {
        self.by_key.get(key).and_then(|idx| self.tasks.get(*idx))
    }

    pub fn contains(&self, key: &TaskKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Resolve a raw `blocked_by`/`blocks` reference. Matching uses the task
    /// identifier only; with duplicates across lists the first in source
    /// order wins.
    pub fn find_by_task_id(&self, task_id: &str) -> Option<&Task> {
        self.by_task_id
            .get(task_id)
            .and_then(|idx| self.tasks.get(*idx))
    }

    /// Resolve user input that is either a composite key or a bare identifier.
    pub fn find(&self, value: &str) -> Option<&Task> {
        if let Some(key) = TaskKey::parse(value) {
            if let Some(task) = self.get(&key) {
                return Some(task);
            }
        }
        self.find_by_task_id(value.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Distinct agent identifiers in source order.
    pub fn agents(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for task in &self.tasks {
            if let Some(agent) = task.agent() {
                if seen.insert(agent.to_string()) {
                    out.push(agent.to_string());
                }
            }
        }
        out
    }
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn task(id: &str, status: &str) -> Task {
        Task::new("list", id, format!("Task {id}"), TaskStatus::from(status))
    }

    pub fn with_deps(id: &str, blocked_by: &[&str], blocks: &[&str]) -> Task {
        let mut task = task(id, STATUS_PENDING);
        task.blocked_by = blocked_by.iter().map(|value| value.to_string()).collect();
        task.blocks = blocks.iter().map(|value| value.to_string()).collect();
        task
    }
}
