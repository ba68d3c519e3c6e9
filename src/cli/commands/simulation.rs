//! Simulation CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use futures::future::join_all;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::context::CliContext;
use crate::cli::display::{
    action_failure, action_success, action_warning, colorize_status, count_label, list_table,
    output, relative_time_str, render_list, short_id, truncate_ellipsis, CommandOutput,
    abandon_unfinished, DetailView, MultiProgressManager, ProgressBarExt,
};
use crate::domain::models::{
    EnvironmentType, Simulation, SimulationConfig, SimulationCreateRequest, SimulationStatus,
    SimulationStatusResponse,
};
use crate::services::{export_result, CreateAndRunOutcome, PollOutcome};

#[derive(Args, Debug)]
pub struct SimulationArgs {
    #[command(subcommand)]
    pub command: SimulationCommands,
}

/// Parameters of a new simulation.
#[derive(Args, Debug, Clone)]
pub struct NewSimulationArgs {
    /// Simulation name
    #[arg(short, long)]
    pub name: String,
    /// Participating agent ID (repeatable)
    #[arg(short, long = "agent", required = true)]
    pub agents: Vec<String>,
    /// Prompt that opens the conversation
    #[arg(short, long)]
    pub prompt: String,
    /// Number of simulation steps (1-50)
    #[arg(short, long, default_value_t = 5)]
    pub steps: u32,
    /// Environment: chat_room, focus_group, interview, custom
    #[arg(short, long = "env", default_value = "chat_room")]
    pub environment: EnvironmentType,
    /// Let agents act one after another within a step
    #[arg(long)]
    pub sequential: bool,
    /// Enable the server-side LLM cache
    #[arg(long)]
    pub cache_enabled: bool,
}

impl NewSimulationArgs {
    /// Build a normalized, validated create request.
    pub fn into_request(self) -> Result<SimulationCreateRequest> {
        let mut config = SimulationConfig::new(self.steps, self.prompt, self.environment);
        config.parallel_actions = Some(!self.sequential);
        config.cache_enabled = Some(self.cache_enabled);

        let request = SimulationCreateRequest {
            name: self.name,
            agent_ids: self.agents.into_iter().map(|id| id.trim().to_string()).collect(),
            config,
        }
        .normalized();
        request.validate()?;
        Ok(request)
    }
}

#[derive(Subcommand, Debug)]
pub enum SimulationCommands {
    /// List simulations
    List,
    /// Show simulation details
    Show {
        /// Simulation ID
        id: String,
    },
    /// Create a simulation without starting it
    Create(NewSimulationArgs),
    /// Start a pending simulation
    Start {
        /// Simulation ID
        id: String,
    },
    /// Create a simulation and start it right away
    Run {
        #[command(flatten)]
        simulation: NewSimulationArgs,
        /// Watch progress until the simulation finishes
        #[arg(short, long)]
        wait: bool,
    },
    /// Show the current status of a simulation
    Status {
        /// Simulation ID
        id: String,
    },
    /// Poll one or more simulations until they finish
    Watch {
        /// Simulation IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show the interactions and summary of a simulation
    Results {
        /// Simulation ID
        id: String,
    },
    /// Write a simulation's result to a JSON file
    Export {
        /// Simulation ID
        id: String,
        /// Target directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Delete a simulation
    Delete {
        /// Simulation ID
        id: String,
    },
}

#[derive(Debug, Serialize)]
pub struct SimulationListOutput {
    pub simulations: Vec<Simulation>,
    pub total: usize,
}

impl CommandOutput for SimulationListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "status", "agents", "steps", "created"]);
        for sim in &self.simulations {
            table.add_row(vec![
                short_id(&sim.id).to_string(),
                truncate_ellipsis(&sim.name, 30),
                colorize_status(sim.status.as_str()).to_string(),
                sim.agent_ids.len().to_string(),
                sim.config.steps.to_string(),
                relative_time_str(&sim.created_at),
            ]);
        }
        render_list("simulation", &table, self.total)
    }
}

#[derive(Debug, Serialize)]
pub struct SimulationDetailOutput {
    #[serde(flatten)]
    pub simulation: Simulation,
}

impl CommandOutput for SimulationDetailOutput {
    fn to_human(&self) -> String {
        let sim = &self.simulation;
        let mut view = DetailView::new(&format!("Simulation: {}", sim.name))
            .field("ID", &sim.id)
            .field("Status", &colorize_status(sim.status.as_str()).to_string())
            .field("Environment", sim.config.environment_type.as_str())
            .field("Steps", &sim.config.steps.to_string())
            .field("Created", &sim.created_at)
            .field_opt("Started", sim.started_at.as_deref())
            .field_opt("Completed", sim.completed_at.as_deref())
            .field_opt("Error", sim.error.as_deref())
            .section("Prompt")
            .item(&sim.config.initial_prompt)
            .section("Agents");
        for id in &sim.agent_ids {
            view = view.item(id);
        }
        if let Some(result) = &sim.result {
            view = view
                .section("Result")
                .field(
                    "Interactions",
                    &count_label(result.interactions.len(), "message", "messages"),
                )
                .field_opt("Summary", result.summary.as_deref());
        }
        view.render()
    }
}

#[derive(Debug, Serialize)]
pub struct SimulationActionOutput {
    pub success: bool,
    pub message: String,
    pub simulation: Option<Simulation>,
}

impl CommandOutput for SimulationActionOutput {
    fn to_human(&self) -> String {
        if self.success {
            action_success(&self.message)
        } else {
            action_warning(&self.message)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    #[serde(flatten)]
    pub status: SimulationStatusResponse,
    /// Step count from the simulation's config, used when the server omits `total_steps`.
    #[serde(skip)]
    pub configured_steps: Option<u32>,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let status = &self.status;
        let steps = match status.total_steps.or(self.configured_steps) {
            Some(fallback) => {
                let (current, total) = status.step_counts(fallback);
                Some(format!("{current}/{total}"))
            }
            None => status.current_step.map(|current| current.to_string()),
        };
        DetailView::new(&format!("Simulation {}", status.id))
            .field("Status", &colorize_status(status.status.as_str()).to_string())
            .field("Progress", &format!("{}%", status.progress_percent()))
            .field_opt("Step", steps.as_deref())
            .field_opt("Message", status.message.as_deref())
            .render()
    }
}

#[derive(Debug, Serialize)]
pub struct ResultsOutput {
    #[serde(flatten)]
    pub simulation: Simulation,
}

impl CommandOutput for ResultsOutput {
    fn to_human(&self) -> String {
        let sim = &self.simulation;
        let Some(result) = &sim.result else {
            return match &sim.error {
                Some(error) => action_failure(&format!("Simulation {} failed: {error}", sim.id)),
                None => format!(
                    "Simulation {} has no results yet (status: {}).",
                    sim.id, sim.status
                ),
            };
        };

        let mut lines = vec![format!(
            "{} ({})",
            console::style(&sim.name).bold(),
            count_label(result.interactions.len(), "message", "messages")
        )];
        for message in &result.interactions {
            lines.push(format!(
                "[{}] {} ({}): {}",
                message.timestamp,
                console::style(&message.agent_name).cyan(),
                message.message_type,
                message.content
            ));
        }
        if let Some(summary) = &result.summary {
            lines.push(String::new());
            lines.push(format!("{} {summary}", console::style("Summary:").bold()));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub simulation_id: String,
    pub path: PathBuf,
}

impl CommandOutput for ExportOutput {
    fn to_human(&self) -> String {
        action_success(&format!("Results exported to {}", self.path.display()))
    }
}

#[derive(Debug, Serialize)]
pub struct WatchEntry {
    pub id: String,
    pub outcome: String,
    pub status: Option<SimulationStatusResponse>,
}

#[derive(Debug, Serialize)]
pub struct WatchOutput {
    pub simulations: Vec<WatchEntry>,
}

impl CommandOutput for WatchOutput {
    fn to_human(&self) -> String {
        self.simulations
            .iter()
            .map(|entry| match entry.status.as_ref().map(|s| s.status) {
                Some(SimulationStatus::Completed) => {
                    action_success(&format!("{} completed", entry.id))
                }
                Some(SimulationStatus::Failed) => action_failure(&format!(
                    "{} failed: {}",
                    entry.id,
                    entry
                        .status
                        .as_ref()
                        .and_then(|s| s.message.as_deref())
                        .unwrap_or("no message")
                )),
                _ => action_warning(&format!("{} stopped watching ({})", entry.id, entry.outcome)),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn status_line(status: &SimulationStatusResponse) -> String {
    match (status.current_step, status.total_steps) {
        (Some(current), Some(total)) => format!("{} step {current}/{total}", status.status),
        _ => status.status.to_string(),
    }
}

/// Poll every id concurrently until each one reaches a terminal status.
///
/// Ctrl-C drops the handles, which cancels every poll.
async fn watch(ctx: &CliContext, ids: Vec<String>, json_mode: bool) -> Result<WatchOutput> {
    let manager = if json_mode {
        MultiProgressManager::hidden()
    } else {
        MultiProgressManager::new()
    };

    let mut bars = Vec::with_capacity(ids.len());
    let mut polls = Vec::with_capacity(ids.len());
    for id in ids {
        let bar = manager.add_percent_bar(short_id(&id).to_string());
        bars.push(bar.clone());
        let updates = bar.clone();
        let handle = ctx.poller.start_polling(id.clone(), move |status| {
            updates.set_position(u64::from(status.progress_percent()));
            updates.set_message(status_line(status));
        });

        polls.push(async move {
            let outcome = handle.join().await;
            match &outcome {
                PollOutcome::Terminal(status) if status.status == SimulationStatus::Completed => {
                    bar.set_position(100);
                    bar.finish_success("completed");
                }
                PollOutcome::Terminal(status) => {
                    bar.finish_error(status.message.clone().unwrap_or_else(|| "failed".to_string()));
                }
                PollOutcome::Cancelled => bar.abandon(),
            }
            match outcome {
                PollOutcome::Terminal(status) => WatchEntry {
                    id,
                    outcome: "terminal".to_string(),
                    status: Some(status),
                },
                PollOutcome::Cancelled => WatchEntry {
                    id,
                    outcome: "cancelled".to_string(),
                    status: None,
                },
            }
        });
    }

    tokio::select! {
        simulations = join_all(polls) => Ok(WatchOutput { simulations }),
        _ = tokio::signal::ctrl_c() => {
            abandon_unfinished(&bars);
            anyhow::bail!("Interrupted, polling cancelled")
        }
    }
}

pub async fn execute(args: SimulationArgs, ctx: &CliContext, json_mode: bool) -> Result<()> {
    match args.command {
        SimulationCommands::List => {
            let list = ctx.simulations.list().await?;
            let out = SimulationListOutput {
                total: list.total,
                simulations: list.simulations,
            };
            output(&out, json_mode);
        }

        SimulationCommands::Show { id } => {
            let simulation = ctx.simulations.get(&id).await?;
            output(&SimulationDetailOutput { simulation }, json_mode);
        }

        SimulationCommands::Create(simulation) => {
            let request = simulation.into_request()?;
            let simulation = ctx.mutations.create_simulation(&request).await?;
            let out = SimulationActionOutput {
                success: true,
                message: format!(
                    "Simulation created: {} ({}), status {}",
                    simulation.name, simulation.id, simulation.status
                ),
                simulation: Some(simulation),
            };
            output(&out, json_mode);
        }

        SimulationCommands::Start { id } => {
            let simulation = ctx.mutations.start_simulation(&id).await?;
            let out = SimulationActionOutput {
                success: true,
                message: format!("Simulation started: {} ({})", simulation.name, simulation.id),
                simulation: Some(simulation),
            };
            output(&out, json_mode);
        }

        SimulationCommands::Run { simulation, wait } => {
            let request = simulation.into_request()?;
            match ctx.mutations.create_and_run(&request).await {
                CreateAndRunOutcome::CreateFailed { error } => {
                    return Err(error).context("Failed to create simulation");
                }
                CreateAndRunOutcome::StartFailed { created, error } => {
                    let out = SimulationActionOutput {
                        success: false,
                        message: format!(
                            "Simulation {} was created but could not be started: {error}. \
                             Start it later with `simsync sim start {}`",
                            created.id, created.id
                        ),
                        simulation: Some(created),
                    };
                    output(&out, json_mode);
                    anyhow::bail!("Simulation start failed");
                }
                CreateAndRunOutcome::Started { simulation } => {
                    let id = simulation.id.clone();
                    let out = SimulationActionOutput {
                        success: true,
                        message: format!("Simulation running: {} ({id})", simulation.name),
                        simulation: Some(simulation),
                    };
                    output(&out, json_mode);
                    if wait {
                        let watched = watch(ctx, vec![id], json_mode).await?;
                        output(&watched, json_mode);
                    }
                }
            }
        }

        SimulationCommands::Status { id } => {
            let status = ctx.simulations.status(&id).await?;
            let configured_steps = match status.total_steps {
                Some(_) => None,
                None => ctx.simulations.get(&id).await.ok().map(|sim| sim.config.steps),
            };
            output(
                &StatusOutput {
                    status,
                    configured_steps,
                },
                json_mode,
            );
        }

        SimulationCommands::Watch { ids } => {
            let watched = watch(ctx, ids, json_mode).await?;
            output(&watched, json_mode);
        }

        SimulationCommands::Results { id } => {
            let simulation = ctx.simulations.results(&id).await?;
            output(&ResultsOutput { simulation }, json_mode);
        }

        SimulationCommands::Export { id, dir } => {
            let simulation = ctx.simulations.results(&id).await?;
            let path = export_result(&simulation, &dir)?;
            let out = ExportOutput {
                simulation_id: id,
                path,
            };
            output(&out, json_mode);
        }

        SimulationCommands::Delete { id } => {
            ctx.mutations.delete_simulation(&id).await?;
            let out = SimulationActionOutput {
                success: true,
                message: format!("Simulation deleted: {id}"),
                simulation: None,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
