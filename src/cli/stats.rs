//! Aggregate counter commands.

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::stats::{AgentTaskStats, TaskStats};

pub struct StatsOptions {
    pub agent: Option<String>,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

pub struct AgentsOptions {
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct StatsOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    agent: Option<String>,
    stats: TaskStats,
}

#[derive(Serialize)]
struct AgentsOutput {
    total: usize,
    agents: Vec<AgentTaskStats>,
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let source = options.config.open_source()?;
    let agent = options.agent.filter(|agent| !agent.trim().is_empty());
    let stats = source.list_task_stats(agent.as_deref())?;
    let output = StatsOutput { agent, stats };

    let header = match output.agent.as_deref() {
        Some(agent) => format!("Task stats for {agent}"),
        None => "Task stats".to_string(),
    };
    let mut human = HumanOutput::new(header);
    let stats = &output.stats;
    human.push_summary("Pending", stats.pending_count.to_string());
    human.push_summary("Ready", stats.available_count.to_string());
    human.push_summary("Blocked", stats.blocked_count.to_string());
    human.push_summary("In progress", stats.in_progress_count.to_string());
    human.push_summary("Completed", stats.completed_count.to_string());
    human.push_summary("Completed today", stats.completed_today.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats",
        &output,
        Some(&human),
    )
}

pub fn run_agents(options: AgentsOptions) -> Result<()> {
    let source = options.config.open_source()?;
    let agents = source.list_agent_task_stats()?;
    let output = AgentsOutput {
        total: agents.len(),
        agents,
    };

    let mut human = HumanOutput::new("Agents");
    human.push_summary("Total", output.total.to_string());
    human.ensure_section("Agents");
    for row in &output.agents {
        human.push_line("Agents", format_agent_line(row));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "agents",
        &output,
        Some(&human),
    )
}

fn format_agent_line(row: &AgentTaskStats) -> String {
    let label = if row.agent_name.is_empty() || row.agent_name == row.agent_id {
        row.agent_id.clone()
    } else {
        format!("{} ({})", row.agent_name, row.agent_id)
    };
    format!(
        "{label}: pending {} (blocked {}), in progress {}, done today {}",
        row.pending_count, row.blocked_count, row.in_progress_count, row.completed_today
    )
}
