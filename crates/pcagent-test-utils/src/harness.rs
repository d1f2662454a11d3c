// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end routing tests.
//!
//! `TestRouter` assembles a `RouterAgent` over mock backends and a manual
//! clock. `run()` drives the full select, execute, feedback cycle.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use pcagent_config::model::PcAgentConfig;
use pcagent_core::ModelTier;
use pcagent_cost::ManualClock;
use pcagent_router::{ExecutionOutcome, RouterAgent, ScoringContext, execute_with_fallback};

use crate::mock_backend::{MockBackend, MockBackendFactory};

/// Builder for test routers with configurable budget, catalog, and failures.
pub struct TestRouterBuilder {
    config: PcAgentConfig,
    start: NaiveDateTime,
    failing: Vec<ModelTier>,
}

impl TestRouterBuilder {
    fn new() -> Self {
        Self {
            config: PcAgentConfig::default(),
            start: default_start(),
            failing: Vec::new(),
        }
    }

    /// Start from an explicit configuration.
    pub fn with_config(mut self, config: PcAgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the daily budget limit.
    pub fn with_daily_budget(mut self, limit: f64) -> Self {
        self.config.budget.daily_limit = limit;
        self
    }

    /// Set the premium/mid/open thresholds.
    pub fn with_thresholds(mut self, premium: f64, mid: f64, open: f64) -> Self {
        self.config.thresholds.premium = premium;
        self.config.thresholds.mid = mid;
        self.config.thresholds.open = open;
        self
    }

    /// Make the backend for `tier` fail every call.
    pub fn with_failing_tier(mut self, tier: ModelTier) -> Self {
        self.failing.push(tier);
        self
    }

    /// Disable `tier` in the catalog.
    pub fn without_tier(mut self, tier: ModelTier) -> Self {
        if let Some(model) = self.config.models.get_mut(&tier) {
            model.enabled = false;
        }
        self
    }

    /// Set the manual clock's start time.
    pub fn starting_at(mut self, start: NaiveDateTime) -> Self {
        self.start = start;
        self
    }

    pub fn build(self) -> TestRouter {
        let factory = self
            .failing
            .into_iter()
            .fold(MockBackendFactory::new(), MockBackendFactory::with_failing_tier);
        let clock = ManualClock::new(self.start);
        let agent = RouterAgent::with_components(&self.config, Arc::new(clock.clone()), &factory);
        TestRouter {
            agent,
            clock,
            factory,
        }
    }
}

/// Wednesday 2026-03-04 09:00, mid-week and mid-month.
fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 4)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

/// A router wired to mock backends and a manual clock.
pub struct TestRouter {
    pub agent: RouterAgent,
    pub clock: ManualClock,
    factory: MockBackendFactory,
}

impl TestRouter {
    pub fn builder() -> TestRouterBuilder {
        TestRouterBuilder::new()
    }

    /// Select, execute with fallback, and feed the outcome back.
    pub fn run(&self, description: &str) -> ExecutionOutcome {
        self.run_with_context(description, None)
    }

    pub fn run_with_context(
        &self,
        description: &str,
        context: Option<&ScoringContext>,
    ) -> ExecutionOutcome {
        let selected = self.agent.select_model(description, context);
        execute_with_fallback(&self.agent, description, &selected)
    }

    /// The mock serving `tier`, if instantiated.
    pub fn mock(&self, tier: ModelTier) -> Option<Arc<MockBackend>> {
        self.factory.backend(tier)
    }
}
