// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in backends and the factory that instantiates the tier catalog.
//!
//! Real model clients are external collaborators. Out of the box, priced
//! tiers get an [`OfflineBackend`] that prices calls but cannot run them,
//! and the rule tier gets the in-process [`RuleBackend`].

use std::sync::Arc;

use pcagent_config::model::ModelConfig;
use pcagent_core::{BackendHandle, ModelTier, PcAgentError};
use pcagent_cost::pricing;

/// Builds a backend handle for a catalog entry.
pub trait BackendFactory: Send + Sync {
    /// Create the backend serving `tier` as configured by `model`.
    fn create(&self, tier: ModelTier, model: &ModelConfig) -> Arc<dyn BackendHandle>;
}

/// Factory used when no real clients are wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBackendFactory;

impl BackendFactory for DefaultBackendFactory {
    fn create(&self, tier: ModelTier, model: &ModelConfig) -> Arc<dyn BackendHandle> {
        match tier {
            ModelTier::Rule => Arc::new(RuleBackend::new(model.name.clone())),
            _ => Arc::new(OfflineBackend::new(tier, model.name.clone(), model.cost_per_unit)),
        }
    }
}

/// A priced tier with no client attached.
///
/// `estimate_cost` works from the configured rate; `invoke` always fails,
/// which sends callers down the fallback chain.
#[derive(Debug, Clone)]
pub struct OfflineBackend {
    tier: ModelTier,
    name: String,
    cost_per_unit: f64,
}

impl OfflineBackend {
    pub fn new(tier: ModelTier, name: impl Into<String>, cost_per_unit: f64) -> Self {
        Self {
            tier,
            name: name.into(),
            cost_per_unit,
        }
    }
}

impl BackendHandle for OfflineBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ModelTier {
        self.tier
    }

    fn estimate_cost(&self, input: &str) -> f64 {
        pricing::estimate_cost(input, self.cost_per_unit)
    }

    fn invoke(&self, _input: &str) -> Result<String, PcAgentError> {
        Err(PcAgentError::backend(
            self.tier,
            format!("no client configured for {}", self.name),
        ))
    }
}

/// Keyword rules in match order: first hit wins.
const RULES: &[(&str, &str)] = &[
    ("click", "click_executed"),
    ("type", "text_typed"),
    ("open", "application_opened"),
    ("close", "application_closed"),
    ("save", "file_saved"),
];

/// Deterministic zero-cost executor for simple GUI actions.
#[derive(Debug, Clone)]
pub struct RuleBackend {
    name: String,
}

impl RuleBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for RuleBackend {
    fn default() -> Self {
        Self::new("rule-based")
    }
}

impl BackendHandle for RuleBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ModelTier {
        ModelTier::Rule
    }

    fn estimate_cost(&self, _input: &str) -> f64 {
        0.0
    }

    fn invoke(&self, input: &str) -> Result<String, PcAgentError> {
        let lower = input.to_lowercase();
        RULES
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, output)| (*output).to_string())
            .ok_or_else(|| PcAgentError::backend(ModelTier::Rule, "no matching rule"))
    }
}
