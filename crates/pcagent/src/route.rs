// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pcagent route` command implementation.
//!
//! Scores each description and reports the tier it would be routed to,
//! without executing anything or spending budget.

use pcagent_config::PcAgentConfig;
use pcagent_core::{ModelTier, PcAgentError};
use pcagent_router::{RouterAgent, ScoringContext};
use serde::Serialize;

/// One routed description for `--json` output.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub description: String,
    pub complexity: f64,
    pub tier: ModelTier,
    pub model: String,
    pub estimated_cost: f64,
    pub budget_remaining: f64,
}

/// Route `descriptions` through a fresh router.
pub fn route_descriptions(
    config: &PcAgentConfig,
    descriptions: &[String],
    success_rate: Option<f64>,
) -> Result<Vec<RouteResponse>, PcAgentError> {
    if let Some(rate) = success_rate {
        if !(0.0..=1.0).contains(&rate) {
            return Err(PcAgentError::InvalidInput(format!(
                "--success-rate must be between 0 and 1, got {rate}"
            )));
        }
    }
    let context = success_rate.map(|rate| ScoringContext {
        historical_success_rate: Some(rate),
        ..Default::default()
    });

    let agent = RouterAgent::new(config);
    let responses = descriptions
        .iter()
        .map(|description| {
            let selected = agent.select_model(description, context.as_ref());
            RouteResponse {
                description: description.clone(),
                complexity: selected.complexity,
                tier: selected.tier,
                model: selected.backend.name().to_string(),
                estimated_cost: selected.backend.estimate_cost(description),
                budget_remaining: agent.budget_status().remaining,
            }
        })
        .collect();
    Ok(responses)
}

/// Run the `pcagent route` command.
pub fn run_route(
    config: &PcAgentConfig,
    descriptions: &[String],
    success_rate: Option<f64>,
    json: bool,
) -> Result<(), PcAgentError> {
    let responses = route_descriptions(config, descriptions, success_rate)?;

    if json {
        return crate::print_json(&responses);
    }

    for r in &responses {
        println!(
            "{:<8} {:.3}  {}  (model: {}, est. cost: {:.6}, budget remaining: {:.2})",
            r.tier.to_string(),
            r.complexity,
            r.description,
            r.model,
            r.estimated_cost,
            r.budget_remaining
        );
    }
    Ok(())
}
