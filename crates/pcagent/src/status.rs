// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pcagent status` command implementation.
//!
//! Expense persistence is external, so this reports the configured limits
//! and the headroom of a fresh tracker.

use pcagent_config::PcAgentConfig;
use pcagent_core::PcAgentError;
use pcagent_cost::{BudgetStatus, BudgetTracker};
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub daily_limit: f64,
    pub weekly_limit: f64,
    pub monthly_limit: f64,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub status: BudgetStatus,
}

pub fn budget_snapshot(config: &PcAgentConfig) -> StatusResponse {
    let mut tracker = BudgetTracker::new(&config.budget);
    let budget = &config.budget;
    StatusResponse {
        daily_limit: budget.daily_limit,
        weekly_limit: budget.weekly_limit,
        monthly_limit: budget.monthly_limit,
        warning_threshold: budget.warning_threshold,
        critical_threshold: budget.critical_threshold,
        status: tracker.check_budget_status(),
    }
}

/// Run the `pcagent status` command.
pub fn run_status(config: &PcAgentConfig, json: bool) -> Result<(), PcAgentError> {
    let snapshot = budget_snapshot(config);
    if json {
        return crate::print_json(&snapshot);
    }

    let s = &snapshot.status;
    println!("pcagent budget ({})", config.agent.name);
    println!(
        "  daily:   {:>10.4} used / {:>10.4} limit ({:.4} left)",
        s.daily_used, snapshot.daily_limit, s.daily_remaining
    );
    println!(
        "  weekly:  {:>10.4} used / {:>10.4} limit ({:.4} left)",
        s.weekly_used, snapshot.weekly_limit, s.weekly_remaining
    );
    println!(
        "  monthly: {:>10.4} used / {:>10.4} limit ({:.4} left)",
        s.monthly_used, snapshot.monthly_limit, s.monthly_remaining
    );
    let level = if s.is_critical {
        "critical"
    } else if s.is_warning {
        "warning"
    } else {
        "ok"
    };
    println!("  status:  {level} (remaining {:.4})", s.remaining);
    Ok(())
}
