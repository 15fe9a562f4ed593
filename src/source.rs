//! Task sources: where a page of tasks and its counters come from.
//!
//! `HttpTaskSource` talks to a Substrate server; `FileTaskSource` reads a
//! JSON snapshot and answers the same queries locally.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::ListFilter;
use crate::error::{Error, Result};
use crate::stats::{self, AgentTaskStats, TaskStats};
use crate::task::{Task, TaskStore};

const TASKS_PATH: &str = "/api/v1/tasks";
const STATS_PATH: &str = "/api/v1/tasks/stats";
const AGENT_STATS_PATH: &str = "/api/v1/tasks/agent-stats";

pub const DEFAULT_LIMIT: usize = 200;

/// Server-side query for one page of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub limit: usize,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            agent_id: None,
            status: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

pub trait TaskSource: Send {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;
    fn list_task_stats(&self, agent_id: Option<&str>) -> Result<TaskStats>;
    fn list_agent_task_stats(&self) -> Result<Vec<AgentTaskStats>>;

    /// Local file backing this source, if any; the viewer watches it.
    fn watch_path(&self) -> Option<&Path> {
        None
    }

    /// Short human label for status lines.
    fn describe(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct TaskListResponse {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct AgentStatsResponse {
    #[serde(default)]
    agents: Vec<AgentTaskStats>,
}

pub struct HttpTaskSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTaskSource {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::InvalidArgument(format!(
                "source url must start with http:// or https://: {base_url}"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: token.filter(|value| !value.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).query(query);
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }
        let response = request.send().map_err(|err| {
            warn!(%url, error = %err, "fetch failed");
            Error::Http(err)
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%url, status = status.as_u16(), "fetch rejected");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url,
                body,
            });
        }
        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl TaskSource for HttpTaskSource {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut query = vec![("limit", filter.limit.to_string())];
        if let Some(agent_id) = filter.agent_id.as_ref() {
            query.push(("agent_id", agent_id.clone()));
        }
        if let Some(status) = filter.status.as_ref() {
            query.push(("status", status.clone()));
        }
        let response: TaskListResponse = self.get(TASKS_PATH, &query)?;
        debug!(url = %self.base_url, count = response.tasks.len(), "tasks fetched");
        Ok(response.tasks)
    }

    fn list_task_stats(&self, agent_id: Option<&str>) -> Result<TaskStats> {
        let query: Vec<(&str, String)> = agent_id
            .map(|agent| vec![("agent_id", agent.to_string())])
            .unwrap_or_default();
        self.get(STATS_PATH, &query)
    }

    fn list_agent_task_stats(&self) -> Result<Vec<AgentTaskStats>> {
        let response: AgentStatsResponse = self.get(AGENT_STATS_PATH, &[])?;
        Ok(response.agents)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Wrapped { tasks: Vec<Task> },
    Bare(Vec<Task>),
}

pub struct FileTaskSource {
    path: PathBuf,
}

impl FileTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the whole snapshot; it is re-read on every call so edits show up.
    pub fn load_all(&self) -> Result<Vec<Task>> {
        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::SnapshotUnreadable(self.path.clone())
            } else {
                Error::Io(err)
            }
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        let tasks = match snapshot {
            Snapshot::Wrapped { tasks } => tasks,
            Snapshot::Bare(tasks) => tasks,
        };
        debug!(path = %self.path.display(), count = tasks.len(), "snapshot read");
        Ok(tasks)
    }
}

impl TaskSource for FileTaskSource {
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let predicate = ListFilter::new(filter.status.clone(), filter.agent_id.clone());
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|task| predicate.matches(task))
            .take(filter.limit)
            .collect())
    }

    fn list_task_stats(&self, agent_id: Option<&str>) -> Result<TaskStats> {
        let store = TaskStore::from_tasks(self.load_all()?);
        let scope = ListFilter::new(None, agent_id.map(str::to_string));
        Ok(stats::compute(
            store.iter().filter(|task| scope.matches(task)),
            &store,
            Utc::now(),
        ))
    }

    fn list_agent_task_stats(&self) -> Result<Vec<AgentTaskStats>> {
        let store = TaskStore::from_tasks(self.load_all()?);
        Ok(stats::compute_by_agent(&store, Utc::now()))
    }

    fn watch_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
