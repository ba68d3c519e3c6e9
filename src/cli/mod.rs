//! Command-line interface for the simulation server.

pub mod commands;
pub mod context;
pub mod display;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::errors::ClientError;

pub use context::CliContext;

#[derive(Parser, Debug)]
#[command(name = "simsync")]
#[command(about = "Drive and observe server-executed agent simulations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (replaces .simsync/config.yaml and .simsync/local.yaml)
    #[arg(long, global = true, env = "SIMSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server base URL, overriding the configuration
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the server is reachable
    Health,
    /// Manage agents
    Agent(commands::agent::AgentArgs),
    /// Manage and run simulations
    #[command(alias = "simulation")]
    Sim(commands::simulation::SimulationArgs),
}

/// Print a failed command's error and exit with status 1.
///
/// Server-reported failures show their status code; validation failures
/// are reported as such without one.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let client_error = err.chain().find_map(|cause| cause.downcast_ref::<ClientError>());
    let status_code = client_error.and_then(ClientError::status_code);

    if json_mode {
        let kind = match client_error {
            Some(ClientError::RequestFailed { .. }) => "request_failed",
            Some(ClientError::ValidationRejected(_)) => "validation_rejected",
            None => "error",
        };
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
            "kind": kind,
            "status_code": status_code,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        let suffix = status_code.map(|code| format!(" (HTTP {code})")).unwrap_or_default();
        eprintln!("{} {err:#}{suffix}", console::style("Error:").red().bold());
    }
    std::process::exit(1);
}
