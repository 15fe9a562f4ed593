//! Task list, board, inspector and viewer commands.

use serde::Serialize;

use crate::board::{self, Column, ListFilter};
use crate::config::{Config, ViewMode};
use crate::deps::{self, Dependencies};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::source::{TaskFilter, TaskSource};
use crate::task::{Task, TaskStore};
use crate::ui::task_viewer::{self, ViewerOptions};

const BLOCKED_BY_SECTION: &str = "Blocked by";
const BLOCKS_SECTION: &str = "Blocks";
const NOT_IN_SCOPE: &str = "not in scope";

pub struct ListOptions {
    pub status: Option<String>,
    pub agent: Option<String>,
    pub limit: Option<usize>,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

pub struct BoardOptions {
    pub agent: Option<String>,
    pub limit: Option<usize>,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub limit: Option<usize>,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

pub struct TuiOptions {
    pub board: bool,
    pub status: Option<String>,
    pub agent: Option<String>,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    total: usize,
    tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
struct BoardOutput<'a> {
    counts: BoardCounts,
    pending: &'a [&'a Task],
    in_progress: &'a [&'a Task],
    completed: &'a [&'a Task],
    excluded: usize,
}

#[derive(Serialize)]
struct BoardCounts {
    pending: usize,
    in_progress: usize,
    completed: usize,
}

#[derive(Serialize)]
struct DependencyRef {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    list_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    in_scope: bool,
}

#[derive(Serialize)]
struct DependencyOutput {
    task: String,
    has_dependencies: bool,
    upstream: Vec<DependencyRef>,
    downstream: Vec<DependencyRef>,
}

#[derive(Serialize)]
struct TaskShowOutput<'a> {
    task: &'a Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_label: Option<&'a str>,
    dependencies: DependencyOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Vec<(String, String)>>,
}

struct TaskContext {
    store: TaskStore,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let filter = ListFilter::new(options.status, options.agent);
    let ctx = load_context(
        &options.config,
        TaskFilter {
            agent_id: filter.agent.clone(),
            status: filter.status.clone(),
            limit: options.limit.unwrap_or(options.config.source.limit),
        },
    )?;
    let tasks = board::filter(ctx.store.iter(), &filter);
    let output = TaskListOutput {
        total: tasks.len(),
        tasks,
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", output.total.to_string());
    if let Some(status) = filter.status.as_deref() {
        human.push_summary("Status", status);
    }
    if let Some(agent) = filter.agent.as_deref() {
        human.push_summary("Agent", agent);
    }
    human.ensure_section("Tasks");
    for task in &output.tasks {
        human.push_line("Tasks", format_task_line(task));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &output,
        Some(&human),
    )
}

pub fn run_board(options: BoardOptions) -> Result<()> {
    let ctx = load_context(
        &options.config,
        TaskFilter {
            agent_id: options.agent.clone().filter(|agent| !agent.trim().is_empty()),
            status: None,
            limit: options.limit.unwrap_or(options.config.source.limit),
        },
    )?;
    let grouped = board::group(ctx.store.iter());
    let [pending, in_progress, completed] = grouped.counts();
    let output = BoardOutput {
        counts: BoardCounts {
            pending,
            in_progress,
            completed,
        },
        pending: &grouped.pending,
        in_progress: &grouped.in_progress,
        completed: &grouped.completed,
        excluded: grouped.excluded.len(),
    };

    let mut human = HumanOutput::new("Board");
    for column in Column::ALL {
        let tasks = grouped.column(column);
        human.push_summary(column.title(), tasks.len().to_string());
    }
    for column in Column::ALL {
        let title = column.title();
        human.ensure_section(title);
        for task in grouped.column(column) {
            human.push_line(title, format_card_line(task));
        }
    }
    if !grouped.excluded.is_empty() {
        human.push_warning(format!(
            "{} task(s) with other statuses not shown",
            grouped.excluded.len()
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "board",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(&options.config, page_filter(&options))?;
    let task = find_task(&ctx.store, &options.id)?;
    let dependencies = deps::resolve(task, &ctx.store);
    let output = TaskShowOutput {
        task,
        active_label: task.active_label(),
        dependencies: dependency_output(task, &dependencies),
        metadata: task.metadata_entries(),
    };

    let mut human = HumanOutput::new(format!("Task {}", task.key()));
    human.push_summary("Subject", task.subject.clone());
    human.push_summary("Status", task.status.to_string());
    if let Some(label) = output.active_label {
        human.push_summary("Active", label);
    }
    if let Some(owner) = task.owner.as_deref() {
        human.push_summary("Owner", owner);
    }
    if let Some(agent) = task.agent_name.as_deref().or(task.agent_id.as_deref()) {
        human.push_summary("Agent", agent);
    }
    for (label, value) in [
        ("Created", task.created_at),
        ("Updated", task.updated_at),
        ("Started", task.started_at),
        ("Completed", task.completed_at),
    ] {
        if let Some(value) = value {
            human.push_summary(label, value.to_rfc3339());
        }
    }
    if let Some(description) = task.description.as_deref() {
        for line in description.lines().filter(|line| !line.trim().is_empty()) {
            human.push_line("Description", line.to_string());
        }
    }
    push_dependency_sections(&mut human, &dependencies);
    if let Some(entries) = output.metadata.as_ref() {
        human.ensure_section("Metadata");
        for (key, value) in entries {
            human.push_line("Metadata", format!("{key}: {value}"));
        }
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        &output,
        Some(&human),
    )
}

pub fn run_deps(options: ShowOptions) -> Result<()> {
    let ctx = load_context(&options.config, page_filter(&options))?;
    let task = find_task(&ctx.store, &options.id)?;
    let dependencies = deps::resolve(task, &ctx.store);
    let output = dependency_output(task, &dependencies);

    let mut human = HumanOutput::new(format!("Dependencies of {}", task.key()));
    if dependencies.is_empty() {
        human.push_summary("Dependencies", "none");
    } else {
        human.push_summary("Upstream", output.upstream.len().to_string());
        human.push_summary("Downstream", output.downstream.len().to_string());
        push_dependency_sections(&mut human, &dependencies);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "deps",
        &output,
        Some(&human),
    )
}

pub fn run_tui(options: TuiOptions) -> Result<()> {
    if options.json {
        return Err(Error::InvalidArgument(
            "task viewer does not support --json".to_string(),
        ));
    }
    if options.quiet {
        return Err(Error::InvalidArgument(
            "task viewer does not support --quiet".to_string(),
        ));
    }
    let source = options.config.open_source()?;
    let mode = if options.board {
        ViewMode::Board
    } else {
        options.config.view.mode
    };
    task_viewer::run(
        source,
        ViewerOptions {
            mode,
            status: options.status.filter(|status| !status.trim().is_empty()),
            agent: options.agent.filter(|agent| !agent.trim().is_empty()),
            limit: options.config.source.limit,
            refresh_secs: options.config.view.refresh_secs,
        },
    )
}

fn load_context(config: &Config, filter: TaskFilter) -> Result<TaskContext> {
    let source = config.open_source()?;
    let tasks = fetch(source.as_ref(), &filter)?;
    Ok(TaskContext {
        store: TaskStore::from_tasks(tasks),
    })
}

fn fetch(source: &dyn TaskSource, filter: &TaskFilter) -> Result<Vec<Task>> {
    tracing::debug!(source = %source.describe(), limit = filter.limit, "loading tasks");
    source.list_tasks(filter)
}

fn page_filter(options: &ShowOptions) -> TaskFilter {
    TaskFilter {
        limit: options.limit.unwrap_or(options.config.source.limit),
        ..TaskFilter::default()
    }
}

fn find_task<'a>(store: &'a TaskStore, id: &str) -> Result<&'a Task> {
    store
        .find(id)
        .ok_or_else(|| Error::TaskNotFound(id.trim().to_string()))
}

fn dependency_output(task: &Task, dependencies: &Dependencies<'_>) -> DependencyOutput {
    let resolved = |task: &Task| DependencyRef {
        id: task.id.clone(),
        list_id: Some(task.list_id.clone()),
        subject: Some(task.subject.clone()),
        status: Some(task.status.to_string()),
        in_scope: true,
    };
    let unresolved = |id: &String| DependencyRef {
        id: id.clone(),
        list_id: None,
        subject: None,
        status: None,
        in_scope: false,
    };
    DependencyOutput {
        task: task.key().to_string(),
        has_dependencies: !dependencies.is_empty(),
        upstream: dependencies
            .upstream
            .iter()
            .map(|task| resolved(task))
            .chain(dependencies.unresolved_upstream.iter().map(unresolved))
            .collect(),
        downstream: dependencies
            .downstream
            .iter()
            .map(|task| resolved(task))
            .chain(dependencies.unresolved_downstream.iter().map(unresolved))
            .collect(),
    }
}

fn push_dependency_sections(human: &mut HumanOutput, dependencies: &Dependencies<'_>) {
    if dependencies.is_empty() {
        return;
    }
    human.ensure_section(BLOCKED_BY_SECTION);
    human.ensure_section(BLOCKS_SECTION);
    for task in &dependencies.upstream {
        human.push_line(BLOCKED_BY_SECTION, format_task_line(task));
    }
    for id in &dependencies.unresolved_upstream {
        human.push_line(BLOCKED_BY_SECTION, format!("{id} ({NOT_IN_SCOPE})"));
    }
    for task in &dependencies.downstream {
        human.push_line(BLOCKS_SECTION, format_task_line(task));
    }
    for id in &dependencies.unresolved_downstream {
        human.push_line(BLOCKS_SECTION, format!("{id} ({NOT_IN_SCOPE})"));
    }
}

fn format_task_line(task: &Task) -> String {
    let mut line = format!("{} [{}] {}", task.key(), task.status, task.subject);
    if let Some(agent) = task.agent_name.as_deref().or(task.agent_id.as_deref()) {
        line.push_str(&format!(" @{agent}"));
    }
    line
}

fn format_card_line(task: &Task) -> String {
    let mut line = format!("{} {}", task.key(), task.subject);
    if let Some(label) = task.active_label() {
        line.push_str(&format!(" ({label})"));
    }
    if !task.blocked_by.is_empty() {
        line.push_str(&format!(" <- {}", task.blocked_by.join(",")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{task, with_deps};

    #[test]
    fn dependency_output_marks_out_of_scope_ids() {
        let store = TaskStore::from_tasks(vec![
            with_deps("1", &[], &["2"]),
            with_deps("2", &["1"], &[]),
            with_deps("3", &["9"], &[]),
        ]);
        let c = store.find_by_task_id("3").expect("task");
        let output = dependency_output(c, &deps::resolve(c, &store));
        assert!(output.has_dependencies);
        assert_eq!(output.upstream.len(), 1);
        assert_eq!(output.upstream[0].id, "9");
        assert!(!output.upstream[0].in_scope);
        assert!(output.downstream.is_empty());
    }

    #[test]
    fn dependency_sections_skip_tasks_without_edges() {
        let store = TaskStore::from_tasks(vec![task("1", "pending")]);
        let lone = store.find_by_task_id("1").expect("task");
        let mut human = HumanOutput::new("Task");
        push_dependency_sections(&mut human, &deps::resolve(lone, &store));
        let text = crate::output::format_human(&human);
        assert!(!text.contains(BLOCKED_BY_SECTION));
    }

    #[test]
    fn card_line_shows_active_label_only_while_running() {
        let mut running = task("1", "in_progress");
        running.active_form = Some("Building".to_string());
        assert!(format_card_line(&running).contains("(Building)"));

        let mut done = task("2", "completed");
        done.active_form = Some("Building".to_string());
        assert!(!format_card_line(&done).contains("Building"));
    }

    #[test]
    fn find_task_reports_missing_id() {
        let store = TaskStore::from_tasks(vec![task("1", "pending")]);
        assert!(find_task(&store, "list/1").is_ok());
        assert!(matches!(
            find_task(&store, "404"),
            Err(Error::TaskNotFound(id)) if id == "404"
        ));
    }
}
