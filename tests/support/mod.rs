use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A JSON snapshot plus an isolated config directory for driving the binary.
pub struct TestSnapshot {
    dir: TempDir,
    path: PathBuf,
}

impl TestSnapshot {
    pub fn new(contents: &str) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tasks.json");
        fs::write(&path, contents)?;
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("config.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Binary invocation reading this snapshot.
    pub fn cmd(&self) -> Command {
        let mut cmd = bare_cmd(self.root());
        cmd.arg("--file").arg(&self.path);
        cmd
    }
}

/// Binary invocation with no source and no ambient config.
pub fn bare_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("substrate-tasks").expect("binary");
    cmd.env_remove("SUBSTRATE_URL")
        .env_remove("SUBSTRATE_TOKEN")
        .env_remove("SUBSTRATE_CONFIG")
        .env_remove("RUST_LOG")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

pub const PROJECT_SNAPSHOT: &str = r#"{
  "tasks": [
    {
      "list_id": "l", "id": "1", "subject": "Design schema", "status": "completed",
      "agent_id": "a1", "agent_name": "Planner", "blocks": ["2"],
      "completed_at": "2024-03-01T10:00:00Z"
    },
    {
      "list_id": "l", "id": "2", "subject": "Build API", "status": "in_progress",
      "active_form": "Building API", "agent_id": "a2",
      "blocked_by": ["1"], "blocks": ["3", "9"]
    },
    {
      "list_id": "l", "id": "3", "subject": "Write docs", "status": "pending",
      "agent_id": "a1", "agent_name": "Planner", "blocked_by": ["2"],
      "metadata": "{\"priority\": \"high\", \"estimate\": 3}"
    },
    {
      "list_id": "l", "id": "4", "subject": "Old idea", "status": "deleted"
    },
    {
      "list_id": "l", "id": "5", "subject": "Triage", "status": "pending",
      "blocked_by": ["8"], "metadata": "not json"
    }
  ]
}"#;
