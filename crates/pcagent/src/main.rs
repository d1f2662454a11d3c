// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PC-Agent router CLI.
//!
//! Scores and routes PC automation subtasks across model tiers under a
//! daily/weekly/monthly budget.

mod config_cmd;
mod route;
mod simulate;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PC-Agent router: budget-aware model tier selection for automation subtasks.
#[derive(Parser, Debug)]
#[command(name = "pcagent", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Score and route one or more subtask descriptions.
    Route {
        /// Subtask descriptions.
        #[arg(required = true)]
        descriptions: Vec<String>,
        /// Historical success rate on similar subtasks (0-1), used as scoring context.
        #[arg(long)]
        success_rate: Option<f64>,
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Route every line of a file and simulate execution with fallback.
    Simulate {
        /// File with one subtask description per line (`#` starts a comment).
        #[arg(long)]
        file: PathBuf,
        /// Seed for simulated backend outcomes.
        #[arg(long)]
        seed: Option<u64>,
        /// Threshold preset applied over the configured thresholds.
        #[arg(long, value_enum)]
        mode: Option<simulate::SimulationMode>,
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show budget limits and headroom.
    Status {
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration and show the effective settings.
    Config {
        /// Print the effective configuration as TOML.
        #[arg(long)]
        show: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let loaded = match &cli.config {
        Some(path) => pcagent_config::load_and_validate_path(path),
        None => pcagent_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            pcagent_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);
    for warning in pcagent_config::config_warnings(&config) {
        tracing::warn!("{warning}");
    }

    let result = match cli.command {
        Some(Commands::Route {
            descriptions,
            success_rate,
            json,
        }) => route::run_route(&config, &descriptions, success_rate, json),
        Some(Commands::Simulate {
            file,
            seed,
            mode,
            json,
        }) => simulate::run_simulate(&config, &file, seed, mode, json),
        Some(Commands::Status { json }) => status::run_status(&config, json),
        Some(Commands::Config { show }) => config_cmd::run_config(&config, show),
        None => {
            println!("pcagent: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pcagent={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Serialize `value` as pretty JSON to stdout.
fn print_json<T: serde::Serialize>(value: &T) -> Result<(), pcagent_core::PcAgentError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| pcagent_core::PcAgentError::Internal(format!("failed to encode JSON: {e}")))?;
    println!("{text}");
    Ok(())
}
