//! Command-line interface for substrate-tasks
//!
//! This module defines the CLI structure using clap derive macros.
//! Handlers live in per-area submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, SourceOverrides, MAX_LIMIT};
use crate::error::Result;

mod stats;
mod task;

/// substrate-tasks - task dependency viewer
///
/// Fetches agent tasks from a Substrate server (or a JSON snapshot) and shows
/// them as a list, a kanban board, and a dependency inspector.
#[derive(Parser, Debug)]
#[command(name = "substrate-tasks")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Substrate server base URL
    #[arg(long, global = true, env = "SUBSTRATE_URL")]
    pub url: Option<String>,

    /// Read tasks from a JSON snapshot instead of a server
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Bearer token for the server
    #[arg(long, global = true, env = "SUBSTRATE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "SUBSTRATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tasks in source order
    List {
        /// Only tasks with this exact status (pending, in_progress, completed, deleted)
        #[arg(long)]
        status: Option<String>,

        /// Only tasks owned by this agent
        #[arg(long)]
        agent: Option<String>,

        /// Page size (defaults to config source.limit)
        #[arg(long, value_parser = parse_limit)]
        limit: Option<usize>,
    },

    /// Show the pending / in progress / completed board
    Board {
        /// Only tasks owned by this agent
        #[arg(long)]
        agent: Option<String>,

        /// Page size (defaults to config source.limit)
        #[arg(long, value_parser = parse_limit)]
        limit: Option<usize>,
    },

    /// Inspect one task with its dependencies
    Show {
        /// Task id or list/task composite key
        id: String,

        /// Page size (defaults to config source.limit)
        #[arg(long, value_parser = parse_limit)]
        limit: Option<usize>,
    },

    /// Resolve a task's upstream and downstream dependencies
    Deps {
        /// Task id or list/task composite key
        id: String,

        /// Page size (defaults to config source.limit)
        #[arg(long, value_parser = parse_limit)]
        limit: Option<usize>,
    },

    /// Aggregate task counters
    Stats {
        /// Scope counters to one agent
        #[arg(long)]
        agent: Option<String>,
    },

    /// Per-agent task counters
    Agents,

    /// Interactive terminal viewer
    Tui {
        /// Open on the board instead of the list
        #[arg(long)]
        board: bool,

        /// Initial status filter for the list
        #[arg(long)]
        status: Option<String>,

        /// Only fetch tasks owned by this agent
        #[arg(long)]
        agent: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let json = self.json;
        let quiet = self.quiet;
        match self.command {
            Commands::List {
                status,
                agent,
                limit,
            } => task::run_list(task::ListOptions {
                status,
                agent,
                limit,
                config,
                json,
                quiet,
            }),
            Commands::Board { agent, limit } => task::run_board(task::BoardOptions {
                agent,
                limit,
                config,
                json,
                quiet,
            }),
            Commands::Show { id, limit } => task::run_show(task::ShowOptions {
                id,
                limit,
                config,
                json,
                quiet,
            }),
            Commands::Deps { id, limit } => task::run_deps(task::ShowOptions {
                id,
                limit,
                config,
                json,
                quiet,
            }),
            Commands::Stats { agent } => stats::run_stats(stats::StatsOptions {
                agent,
                config,
                json,
                quiet,
            }),
            Commands::Agents => stats::run_agents(stats::AgentsOptions {
                config,
                json,
                quiet,
            }),
            Commands::Tui {
                board,
                status,
                agent,
            } => task::run_tui(task::TuiOptions {
                board,
                status,
                agent,
                config,
                json,
                quiet,
            }),
        }
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = Config::resolve(self.config.as_deref())?;
        config.apply_overrides(SourceOverrides {
            url: self.url.clone(),
            file: self.file.clone(),
            token: self.token.clone(),
        })?;
        Ok(config)
    }
}

fn parse_limit(value: &str) -> std::result::Result<usize, String> {
    let limit: usize = value
        .parse()
        .map_err(|_| format!("`{value}` is not a page size"))?;
    if limit == 0 || limit > MAX_LIMIT {
        return Err(format!("must be between 1 and {MAX_LIMIT}"));
    }
    Ok(limit)
}
