// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing composition: score, check budget, select, record.
//!
//! [`RouterAgent`] owns one scorer, one budget tracker, and one selector.
//! Each mutable collaborator sits behind its own mutex; locks are taken one
//! at a time and never nested, so the agent can be shared across threads.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pcagent_config::model::PcAgentConfig;
use pcagent_core::{BackendHandle, ModelTier, truncate_chars};
use pcagent_cost::{BudgetStatus, BudgetTracker, Clock, ExpenseRecord, HistoryWindow, SystemClock};
use serde::Serialize;
use tracing::{debug, info};

use crate::backends::{BackendFactory, DefaultBackendFactory};
use crate::scorer::{ComplexityScorer, ScoringContext, TierPerformance};
use crate::selector::ModelSelector;

/// Characters of subtask text kept per routing decision.
pub const MAX_SUBTASK_CHARS: usize = 50;

/// Tier chosen for a subtask, ready for the caller to execute.
#[derive(Clone)]
pub struct SelectedModel {
    pub tier: ModelTier,
    pub backend: Arc<dyn BackendHandle>,
    pub complexity: f64,
}

impl std::fmt::Debug for SelectedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedModel")
            .field("tier", &self.tier)
            .field("backend", &self.backend.name())
            .field("complexity", &self.complexity)
            .finish()
    }
}

/// One routing decision, kept for aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    /// Subtask description, truncated to [`MAX_SUBTASK_CHARS`].
    pub subtask: String,
    pub complexity: f64,
    pub tier: ModelTier,
    /// Overall remaining budget when the decision was made.
    pub budget_remaining: f64,
}

/// Aggregate routing statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingStats {
    /// Decisions made over the agent's lifetime.
    pub total_decisions: u64,
    /// Decisions still held in the history window.
    pub retained_decisions: usize,
    /// Fraction of retained decisions per tier.
    pub model_distribution: BTreeMap<ModelTier, f64>,
    /// Mean complexity over retained decisions, 0 when empty.
    pub avg_complexity: f64,
    /// Total cost over the full expense ledger.
    pub budget_used: f64,
    pub budget_remaining: f64,
}

/// Bounded routing history.
#[derive(Debug)]
struct RoutingHistory {
    decisions: VecDeque<RoutingDecision>,
    capacity: usize,
    total: u64,
}

impl RoutingHistory {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            decisions: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            total: 0,
        }
    }

    fn push(&mut self, decision: RoutingDecision) {
        if self.decisions.len() == self.capacity {
            self.decisions.pop_front();
        }
        self.decisions.push_back(decision);
        self.total += 1;
    }

    fn distribution(&self) -> BTreeMap<ModelTier, f64> {
        let mut counts: BTreeMap<ModelTier, usize> = BTreeMap::new();
        for decision in &self.decisions {
            *counts.entry(decision.tier).or_insert(0) += 1;
        }
        let total = self.decisions.len() as f64;
        counts
            .into_iter()
            .map(|(tier, count)| (tier, count as f64 / total))
            .collect()
    }

    fn average_complexity(&self) -> f64 {
        if self.decisions.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.decisions.iter().map(|d| d.complexity).sum();
        sum / self.decisions.len() as f64
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Budget-aware router for subtasks.
pub struct RouterAgent {
    scorer: Mutex<ComplexityScorer>,
    budget: Mutex<BudgetTracker>,
    selector: ModelSelector,
    history: Mutex<RoutingHistory>,
}

impl RouterAgent {
    /// Create a router on the system clock with the default backends.
    pub fn new(config: &PcAgentConfig) -> Self {
        Self::with_components(config, Arc::new(SystemClock), &DefaultBackendFactory)
    }

    /// Create a router with an explicit clock and backend factory.
    pub fn with_components(
        config: &PcAgentConfig,
        clock: Arc<dyn Clock>,
        factory: &dyn BackendFactory,
    ) -> Self {
        Self::from_parts(
            ComplexityScorer::new(config),
            BudgetTracker::with_clock(&config.budget, clock),
            ModelSelector::with_factory(config, factory),
            config.routing.history_capacity,
        )
    }

    /// Assemble a router from already-built collaborators.
    pub fn from_parts(
        scorer: ComplexityScorer,
        budget: BudgetTracker,
        selector: ModelSelector,
        history_capacity: usize,
    ) -> Self {
        info!(
            tiers = selector.get_available_models().len(),
            history_capacity, "router agent initialized"
        );
        Self {
            scorer: Mutex::new(scorer),
            budget: Mutex::new(budget),
            selector,
            history: Mutex::new(RoutingHistory::new(history_capacity)),
        }
    }

    /// Route a subtask: score it, check the budget, pick a tier, record the decision.
    ///
    /// Never fails; budget exhaustion routes to the zero-cost rule tier.
    pub fn select_model(
        &self,
        description: &str,
        context: Option<&ScoringContext>,
    ) -> SelectedModel {
        let complexity = lock(&self.scorer).calculate_complexity(description, context);
        let status = lock(&self.budget).check_budget_status();
        let (tier, backend) = self.selector.select_model(complexity, &status);

        lock(&self.history).push(RoutingDecision {
            subtask: truncate_chars(description, MAX_SUBTASK_CHARS),
            complexity,
            tier,
            budget_remaining: status.remaining,
        });

        SelectedModel {
            tier,
            backend,
            complexity,
        }
    }

    /// Feed an execution outcome back and bill the tier.
    ///
    /// Billable tiers are charged their per-unit cost whether or not the
    /// subtask succeeded.
    pub fn update_routing_performance(&self, description: &str, tier: ModelTier, success: bool) {
        lock(&self.scorer).update_model_performance(description, tier, success);

        if tier.is_billable() {
            let cost = self.selector.get_model_cost(tier);
            lock(&self.budget).record_outcome(cost, tier, description, success);
        }

        debug!(tier = %tier, success, "routing performance updated");
    }

    /// Aggregate statistics over the retained routing history.
    pub fn get_routing_stats(&self) -> RoutingStats {
        let (total_decisions, retained_decisions, model_distribution, avg_complexity) = {
            let history = lock(&self.history);
            (
                history.total,
                history.decisions.len(),
                history.distribution(),
                history.average_complexity(),
            )
        };
        let (budget_used, budget_remaining) = {
            let mut budget = lock(&self.budget);
            (budget.get_total_expenses(), budget.get_remaining_budget())
        };

        RoutingStats {
            total_decisions,
            retained_decisions,
            model_distribution,
            avg_complexity,
            budget_used,
            budget_remaining,
        }
    }

    /// Retained routing decisions, oldest first.
    pub fn routing_history(&self) -> Vec<RoutingDecision> {
        lock(&self.history).decisions.iter().cloned().collect()
    }

    /// Current budget status.
    pub fn budget_status(&self) -> BudgetStatus {
        lock(&self.budget).check_budget_status()
    }

    /// Ledger records within a rolling window.
    pub fn expense_history(&self, window: HistoryWindow) -> Vec<ExpenseRecord> {
        lock(&self.budget).get_expense_history(window)
    }

    /// Total cost per tier.
    pub fn expense_breakdown(&self) -> BTreeMap<ModelTier, f64> {
        lock(&self.budget).get_model_expense_breakdown()
    }

    /// Override the daily budget limit.
    pub fn set_daily_limit(&self, limit: f64) {
        lock(&self.budget).set_daily_limit(limit);
    }

    /// Next tier in the fallback chain after `tier`.
    pub fn fallback_model(&self, tier: ModelTier) -> Option<ModelTier> {
        self.selector.fallback_model(tier)
    }

    /// Backend for an instantiated tier.
    pub fn backend(&self, tier: ModelTier) -> Option<Arc<dyn BackendHandle>> {
        self.selector.backend(tier)
    }

    /// Outcome tally for `tier`.
    pub fn tier_performance(&self, tier: ModelTier) -> TierPerformance {
        lock(&self.scorer).performance(tier)
    }

    /// The tier selector.
    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }
}
