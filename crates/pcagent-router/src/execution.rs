// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-side execution with tier degradation.
//!
//! The router itself never retries. This is the policy callers are expected
//! to apply when a backend fails: move to the next tier in the fallback
//! chain, and once the chain is exhausted, try the zero-cost rule tier.
//! Every attempt that reaches a backend is fed back to the router, so failed
//! calls on billable tiers are still charged.

use pcagent_core::{ModelTier, PcAgentError};
use tracing::{debug, warn};

use crate::agent::{RouterAgent, SelectedModel};

/// Result of running one subtask through the fallback chain.
#[derive(Debug)]
pub struct ExecutionOutcome {
    /// Last tier tried; the one that produced `result`.
    pub tier: ModelTier,
    /// Backend output, or the last backend error.
    pub result: Result<String, PcAgentError>,
    /// Tiers tried in order, including ones skipped as not instantiated.
    pub attempted: Vec<ModelTier>,
}

impl ExecutionOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the subtask ran on a different tier than the one selected.
    pub fn degraded(&self) -> bool {
        self.attempted.len() > 1
    }
}

/// Run `description` on the selected backend, degrading along the fallback chain.
pub fn execute_with_fallback(
    agent: &RouterAgent,
    description: &str,
    selected: &SelectedModel,
) -> ExecutionOutcome {
    let mut attempted = Vec::new();
    let mut last_error = None;
    let mut current = selected.tier;

    loop {
        attempted.push(current);

        match agent.backend(current) {
            Some(backend) => match backend.invoke(description) {
                Ok(output) => {
                    agent.update_routing_performance(description, current, true);
                    debug!(tier = %current, attempts = attempted.len(), "subtask executed");
                    return ExecutionOutcome {
                        tier: current,
                        result: Ok(output),
                        attempted,
                    };
                }
                Err(err) => {
                    warn!(tier = %current, error = %err, "backend failed, degrading");
                    agent.update_routing_performance(description, current, false);
                    last_error = Some(err);
                }
            },
            None => debug!(tier = %current, "tier not instantiated, skipping"),
        }

        let next = next_untried(agent.selector().fallback_order(), current, &attempted)
            .or_else(|| (!attempted.contains(&ModelTier::Rule)).then_some(ModelTier::Rule));
        match next {
            Some(tier) => current = tier,
            None => break,
        }
    }

    ExecutionOutcome {
        tier: current,
        result: Err(last_error
            .unwrap_or_else(|| PcAgentError::Internal("no backend available".to_string()))),
        attempted,
    }
}

/// First tier after `current` in `order` that has not been attempted yet.
///
/// `current` is located by its first occurrence, matching
/// [`RouterAgent::fallback_model`]; later entries already tried are skipped.
fn next_untried(
    order: &[ModelTier],
    current: ModelTier,
    attempted: &[ModelTier],
) -> Option<ModelTier> {
    let index = order.iter().position(|t| *t == current)?;
    order[index + 1..]
        .iter()
        .copied()
        .find(|tier| !attempted.contains(tier))
}

#[cfg(test)]
mod tests {
    use pcagent_config::model::PcAgentConfig;
    use pcagent_cost::HistoryWindow;

    use super::*;

    const OPENING: &str =
        "Open Excel, copy the data from Sheet1 to Word, then format it and calculate the sum if it changed.";

    #[test]
    fn offline_tiers_degrade_to_rule() {
        let agent = RouterAgent::new(&PcAgentConfig::default());
        let selected = agent.select_model(OPENING, None);
        assert_eq!(selected.tier, ModelTier::Premium);

        let outcome = execute_with_fallback(&agent, OPENING, &selected);
        assert!(outcome.succeeded());
        assert!(outcome.degraded());
        assert_eq!(outcome.tier, ModelTier::Rule);
        assert_eq!(
            outcome.attempted,
            vec![ModelTier::Premium, ModelTier::Mid, ModelTier::Open, ModelTier::Rule]
        );
        assert_eq!(outcome.result.unwrap(), "application_opened");

        // Premium and mid are charged for their failed attempts.
        let charged = agent.expense_history(HistoryWindow::All);
        assert_eq!(charged.len(), 3);
        assert!(charged.iter().all(|r| !r.success));
        assert!((agent.get_routing_stats().budget_used - 0.023).abs() < 1e-12);
    }

    #[test]
    fn rule_success_needs_no_fallback() {
        let agent = RouterAgent::new(&PcAgentConfig::default());
        let selected = agent.select_model("click save", None);
        let outcome = execute_with_fallback(&agent, "click save", &selected);
        assert!(outcome.succeeded());
        assert!(!outcome.degraded());
        assert_eq!(agent.tier_performance(ModelTier::Rule).successes, 1);
    }

    #[test]
    fn rule_is_tried_after_short_chain() {
        let mut config = PcAgentConfig::default();
        config.fallback.fallback_order = vec![ModelTier::Premium, ModelTier::Mid];
        let agent = RouterAgent::new(&config);
        let selected = agent.select_model(OPENING, None);

        let outcome = execute_with_fallback(&agent, OPENING, &selected);
        assert_eq!(
            outcome.attempted,
            vec![ModelTier::Premium, ModelTier::Mid, ModelTier::Rule]
        );
        assert!(outcome.succeeded());
    }

    #[test]
    fn every_tier_failing_returns_last_error() {
        let agent = RouterAgent::new(&PcAgentConfig::default());
        let task = "Summarize the quarterly report from Outlook to Word based on the chart.";
        let selected = agent.select_model(task, None);
        let outcome = execute_with_fallback(&agent, task, &selected);
        assert!(!outcome.succeeded());
        assert_eq!(outcome.tier, ModelTier::Rule);
        let err = outcome.result.unwrap_err();
        assert_eq!(err.failed_tier(), Some(ModelTier::Rule));
    }

    #[test]
    fn repeated_entry_does_not_hide_later_tiers() {
        let mut config = PcAgentConfig::default();
        config.fallback.fallback_order =
            vec![ModelTier::Mid, ModelTier::Premium, ModelTier::Mid, ModelTier::Open];
        let agent = RouterAgent::new(&config);
        let selected = agent.select_model(OPENING, None);
        assert_eq!(selected.tier, ModelTier::Premium);

        let outcome = execute_with_fallback(&agent, OPENING, &selected);
        assert_eq!(
            outcome.attempted,
            vec![ModelTier::Premium, ModelTier::Mid, ModelTier::Open, ModelTier::Rule]
        );
        assert!(outcome.succeeded());
    }

    #[test]
    fn next_untried_skips_attempted_entries() {
        let order = [ModelTier::Mid, ModelTier::Premium, ModelTier::Mid, ModelTier::Open];
        assert_eq!(
            next_untried(&order, ModelTier::Mid, &[ModelTier::Premium, ModelTier::Mid]),
            Some(ModelTier::Open)
        );
        assert_eq!(next_untried(&order, ModelTier::Open, &[ModelTier::Open]), None);
        assert_eq!(next_untried(&order, ModelTier::Rule, &[]), None);
    }

    #[test]
    fn cyclic_chain_terminates() {
        let mut config = PcAgentConfig::default();
        config.fallback.fallback_order = vec![ModelTier::Mid, ModelTier::Premium, ModelTier::Mid];
        let agent = RouterAgent::new(&config);
        let selected = agent.select_model(OPENING, None);
        let outcome = execute_with_fallback(&agent, OPENING, &selected);
        assert_eq!(
            outcome.attempted,
            vec![ModelTier::Premium, ModelTier::Mid, ModelTier::Rule]
        );
    }
}
