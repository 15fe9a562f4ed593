//! Board grouping and list filtering.
//!
//! Both views keep source order; nothing is re-sorted client-side.

use serde::Serialize;

use crate::task::{Task, TaskStatus, STATUS_COMPLETED, STATUS_IN_PROGRESS, STATUS_PENDING};

/// The three fixed board columns, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Pending,
    InProgress,
    Completed,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Pending, Column::InProgress, Column::Completed];

    pub fn status(self) -> &'static str {
        match self {
            Column::Pending => STATUS_PENDING,
            Column::InProgress => STATUS_IN_PROGRESS,
            Column::Completed => STATUS_COMPLETED,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::Pending => "Pending",
            Column::InProgress => "In Progress",
            Column::Completed => "Completed",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Column::Pending => 0,
            Column::InProgress => 1,
            Column::Completed => 2,
        }
    }

    pub fn for_status(status: &TaskStatus) -> Option<Column> {
        match status.as_str() {
            STATUS_PENDING => Some(Column::Pending),
            STATUS_IN_PROGRESS => Some(Column::InProgress),
            STATUS_COMPLETED => Some(Column::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Board<'a> {
    pub pending: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
    /// Tasks with any other status (e.g. `deleted`); never shown as a column.
    pub excluded: Vec<&'a Task>,
}

impl<'a> Board<'a> {
    pub fn column(&self, column: Column) -> &[&'a Task] {
        match column {
            Column::Pending => &self.pending,
            Column::InProgress => &self.in_progress,
            Column::Completed => &self.completed,
        }
    }

    /// Visible column sizes as `[pending, in_progress, completed]`.
    pub fn counts(&self) -> [usize; 3] {
        [
            self.pending.len(),
            self.in_progress.len(),
            self.completed.len(),
        ]
    }
}

/// Partition every task into exactly one bucket by status string equality.
pub fn group<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Board<'a> {
    let mut board = Board::default();
    for task in tasks {
        match Column::for_status(&task.status) {
            Some(Column::Pending) => board.pending.push(task),
            Some(Column::InProgress) => board.in_progress.push(task),
            Some(Column::Completed) => board.completed.push(task),
            None => board.excluded.push(task),
        }
    }
    board
}

/// Flat-list predicates, combined with AND. Empty values mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl ListFilter {
    pub fn new(status: Option<String>, agent: Option<String>) -> Self {
        Self {
            status: status.filter(|value| !value.trim().is_empty()),
            agent: agent.filter(|value| !value.trim().is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.agent.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status.as_deref() {
            if task.status.as_str() != status {
                return false;
            }
        }
        if let Some(agent) = self.agent.as_deref() {
            let owned_by = task.agent_id.as_deref() == Some(agent)
                || task.agent_name.as_deref() == Some(agent);
            if !owned_by {
                return false;
            }
        }
        true
    }
}

pub fn filter<'a>(tasks: impl IntoIterator<Item = &'a Task>, filter: &ListFilter) -> Vec<&'a Task> {
    tasks
        .into_iter()
        .filter(|task| filter.matches(task))
        .collect()
}
