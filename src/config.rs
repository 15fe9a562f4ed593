//! Configuration loading and management
//!
//! Handles parsing of `config.toml` from the user config directory (or an
//! explicit path) and merging command-line source overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::source::{FileTaskSource, HttpTaskSource, TaskSource, DEFAULT_LIMIT};

const CONFIG_FILE: &str = "config.toml";
pub const MAX_LIMIT: usize = 1000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where tasks come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Terminal viewer settings
    #[serde(default)]
    pub view: ViewConfig,
}

/// Task source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Substrate server base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// JSON snapshot file, as an alternative to `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Bearer token sent with HTTP requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Page size for task listings
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            file: None,
            token: None,
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which presentation the viewer opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    List,
    Board,
}

/// Terminal viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Initial view mode
    #[serde(default)]
    pub mode: ViewMode,

    /// Poll interval for HTTP sources, in seconds
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_refresh_secs() -> u64 {
    5
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            mode: ViewMode::default(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

/// Command-line overrides for the source section.
#[derive(Debug, Clone, Default)]
pub struct SourceOverrides {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Default config location under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "substrate")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load an explicit path strictly, or the default location leniently.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        Ok(Self::default_path()
            .map(|path| Self::load_or_default(&path))
            .unwrap_or_default())
    }

    /// Load configuration from a path, or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Flags win over the file; a flag for one kind of source replaces the
    /// other kind from the file.
    pub fn apply_overrides(&mut self, overrides: SourceOverrides) -> Result<()> {
        if overrides.url.is_some() && overrides.file.is_some() {
            return Err(Error::InvalidArgument(
                "--url and --file are mutually exclusive".to_string(),
            ));
        }
        if let Some(url) = overrides.url {
            self.source.url = Some(url);
            self.source.file = None;
        }
        if let Some(file) = overrides.file {
            self.source.file = Some(file);
            self.source.url = None;
        }
        if let Some(token) = overrides.token {
            self.source.token = Some(token);
        }
        self.validate()
    }

    /// Build the configured task source.
    pub fn open_source(&self) -> Result<Box<dyn TaskSource>> {
        if let Some(url) = self.source.url.as_deref() {
            let source = HttpTaskSource::new(
                url,
                self.source.token.clone(),
                Duration::from_secs(self.source.timeout_secs),
            )?;
            return Ok(Box::new(source));
        }
        if let Some(file) = self.source.file.as_ref() {
            return Ok(Box::new(FileTaskSource::new(file.clone())));
        }
        Err(Error::NoSource)
    }

    fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.view.validate()?;
        Ok(())
    }
}

impl SourceConfig {
    fn validate(&self) -> Result<()> {
        if self.url.is_some() && self.file.is_some() {
            return Err(Error::InvalidConfig(
                "source.url and source.file cannot both be set".to_string(),
            ));
        }
        if let Some(url) = self.url.as_deref() {
            if url.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "source.url cannot be empty".to_string(),
                ));
            }
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "source.limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "source.timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl ViewConfig {
    fn validate(&self) -> Result<()> {
        if self.refresh_secs == 0 {
            return Err(Error::InvalidConfig(
                "view.refresh_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert!(cfg.source.url.is_none());
        assert!(cfg.source.file.is_none());
        assert_eq!(cfg.source.limit, 200);
        assert_eq!(cfg.source.timeout_secs, 10);
        assert_eq!(cfg.view.mode, ViewMode::List);
        assert_eq!(cfg.view.refresh_secs, 5);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let content = r#"
[source]
url = "http://substrate.local:8080"
token = "secret"
limit = 50
timeout_secs = 3

[view]
mode = "board"
refresh_secs = 30
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.source.url.as_deref(), Some("http://substrate.local:8080"));
        assert_eq!(cfg.source.token.as_deref(), Some("secret"));
        assert_eq!(cfg.source.limit, 50);
        assert_eq!(cfg.source.timeout_secs, 3);
        assert_eq!(cfg.view.mode, ViewMode::Board);
        assert_eq!(cfg.view.refresh_secs, 30);
    }

    #[test]
    fn url_and_file_together_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let content = r#"
[source]
url = "http://localhost"
file = "tasks.json"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_limit_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[source]\nlimit = 0").expect("write config");
        assert!(matches!(
            Config::load(&path),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_or_default_tolerates_missing_and_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_or_default(&path).source.limit, 200);

        fs::write(&path, "[view]\nrefresh_secs = 0").expect("write config");
        assert_eq!(Config::load_or_default(&path).view.refresh_secs, 5);
    }

    #[test]
    fn flag_overrides_replace_file_source() {
        let mut cfg = Config::default();
        cfg.source.url = Some("http://localhost".to_string());
        cfg.apply_overrides(SourceOverrides {
            file: Some(PathBuf::from("tasks.json")),
            ..SourceOverrides::default()
        })
        .expect("overrides");
        assert!(cfg.source.url.is_none());
        assert_eq!(cfg.source.file, Some(PathBuf::from("tasks.json")));

        let err = cfg
            .apply_overrides(SourceOverrides {
                url: Some("http://a".to_string()),
                file: Some(PathBuf::from("b")),
                token: None,
            })
            .expect_err("conflict");
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn open_source_requires_a_source() {
        let cfg = Config::default();
        assert!(matches!(cfg.open_source(), Err(Error::NoSource)));
    }
}
