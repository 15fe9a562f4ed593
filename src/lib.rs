//! substrate-tasks - Task Dependency Viewer Library
//!
//! This library provides the core functionality for the substrate-tasks CLI,
//! a read-only viewer for tasks produced by agents through an external
//! task-tracking integration.
//!
//! # Core Concepts
//!
//! - **Tasks**: records keyed by `list_id/task_id`, fetched one page at a time
//! - **Dependencies**: `blocked_by`/`blocks` references resolved against the
//!   loaded page; references outside it are kept as "not in scope"
//! - **Selection**: a two-state detail panel (closed, or open on one task)
//! - **Board**: pending / in progress / completed columns in source order
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `task`: Task records and the store adapter
//! - `deps`: Dependency resolver
//! - `selection`: Selection, highlight and navigation
//! - `board`: Board grouping and list filtering
//! - `observe`: Observable state holders
//! - `stats`: Aggregate counters
//! - `source`: HTTP and snapshot-file task sources
//! - `view`: Page-level owner of tasks and selection
//! - `ui`: Terminal viewer

pub mod board;
pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod observe;
pub mod output;
pub mod selection;
pub mod source;
pub mod stats;
pub mod task;
pub mod ui;
pub mod view;

pub use error::{Error, Result};
