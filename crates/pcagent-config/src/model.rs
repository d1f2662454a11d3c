// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the PC-Agent router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Every field has a documented default, so an empty
//! document yields a fully usable configuration.

use std::collections::BTreeMap;

use pcagent_core::ModelTier;
use serde::{Deserialize, Serialize};

/// Affordability floor applied when a tier has no `min_cost_per_call`.
pub const DEFAULT_MIN_COST_PER_CALL: f64 = 0.001;

/// Top-level PC-Agent configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PcAgentConfig {
    /// Agent identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Model tier catalog keyed by tier.
    #[serde(default = "default_models")]
    pub models: BTreeMap<ModelTier, ModelConfig>,

    /// Complexity thresholds for tier selection.
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Daily, weekly, and monthly spending limits.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Ordered fallback chain.
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Per-feature weight overrides, merged over the built-in defaults.
    #[serde(default)]
    pub complexity_weights: BTreeMap<String, f64>,

    /// Complexity scoring history settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Routing decision history settings.
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl Default for PcAgentConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            models: default_models(),
            thresholds: ThresholdConfig::default(),
            budget: BudgetConfig::default(),
            fallback: FallbackConfig::default(),
            complexity_weights: BTreeMap::new(),
            scoring: ScoringConfig::default(),
            routing: RoutingConfig::default(),
        }
    }
}

impl PcAgentConfig {
    /// Configured entry for `tier`, if any.
    pub fn model(&self, tier: ModelTier) -> Option<&ModelConfig> {
        self.models.get(&tier)
    }
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "pcagent".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A single tier in the model catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Display name of the backing model (e.g. "gpt-4o").
    #[serde(default)]
    pub name: String,

    /// Cost per unit of usage (per 1k tokens), also charged per call by the router.
    #[serde(default, alias = "cost_per_1k_tokens")]
    pub cost_per_unit: f64,

    /// Only enabled tiers are instantiated. `rule` is instantiated regardless.
    #[serde(default)]
    pub enabled: bool,

    /// Minimum remaining budget required before this tier may be selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cost_per_call: Option<f64>,
}

impl ModelConfig {
    /// Create an enabled tier entry with no explicit affordability floor.
    pub fn new(name: impl Into<String>, cost_per_unit: f64) -> Self {
        Self {
            name: name.into(),
            cost_per_unit,
            enabled: true,
            min_cost_per_call: None,
        }
    }

    /// Affordability floor, falling back to [`DEFAULT_MIN_COST_PER_CALL`].
    pub fn affordability_floor(&self) -> f64 {
        self.min_cost_per_call.unwrap_or(DEFAULT_MIN_COST_PER_CALL)
    }
}

fn default_models() -> BTreeMap<ModelTier, ModelConfig> {
    BTreeMap::from([
        (ModelTier::Premium, ModelConfig::new("gpt-4o", 0.015)),
        (ModelTier::Mid, ModelConfig::new("claude-3.5-sonnet", 0.008)),
        (ModelTier::Open, ModelConfig::new("qwen2.5-vl-72b", 0.0)),
        (ModelTier::Rule, ModelConfig::new("rule-based", 0.0)),
    ])
}

/// Complexity thresholds. Sane routing needs `premium >= mid >= open`;
/// this is advised but not enforced.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Complexity above which the premium tier is preferred.
    #[serde(default = "default_premium_threshold")]
    pub premium: f64,

    /// Complexity above which the mid tier is preferred.
    #[serde(default = "default_mid_threshold")]
    pub mid: f64,

    /// Complexity above which the open tier is preferred.
    #[serde(default = "default_open_threshold")]
    pub open: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            premium: default_premium_threshold(),
            mid: default_mid_threshold(),
            open: default_open_threshold(),
        }
    }
}

fn default_premium_threshold() -> f64 {
    0.8
}

fn default_mid_threshold() -> f64 {
    0.5
}

fn default_open_threshold() -> f64 {
    0.2
}

/// Spending limits and status thresholds, in currency units.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetConfig {
    /// Limit for the current calendar day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: f64,

    /// Limit for the current ISO week (Monday start).
    #[serde(default = "default_weekly_limit")]
    pub weekly_limit: f64,

    /// Limit for the current calendar month.
    #[serde(default = "default_monthly_limit")]
    pub monthly_limit: f64,

    /// Daily remaining at or below this value reports a warning.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,

    /// Daily remaining at or below this value reports critical.
    /// Expected to be `<= warning_threshold`.
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            weekly_limit: default_weekly_limit(),
            monthly_limit: default_monthly_limit(),
            warning_threshold: default_warning_threshold(),
            critical_threshold: default_critical_threshold(),
        }
    }
}

fn default_daily_limit() -> f64 {
    10.0
}

fn default_weekly_limit() -> f64 {
    50.0
}

fn default_monthly_limit() -> f64 {
    200.0
}

fn default_warning_threshold() -> f64 {
    2.0
}

fn default_critical_threshold() -> f64 {
    0.5
}

/// Ordered fallback chain used when a backend fails.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackConfig {
    /// Tiers in downgrade order; the entry after a failed tier is tried next.
    #[serde(default = "default_fallback_order")]
    pub fallback_order: Vec<ModelTier>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            fallback_order: default_fallback_order(),
        }
    }
}

fn default_fallback_order() -> Vec<ModelTier> {
    vec![
        ModelTier::Premium,
        ModelTier::Mid,
        ModelTier::Open,
        ModelTier::Rule,
    ]
}

/// When the scoring history is trimmed back to capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTrim {
    /// Trim only when performance feedback arrives.
    #[default]
    OnFeedback,
    /// Trim on every scoring call; history never exceeds capacity.
    OnEveryScore,
}

/// Complexity scorer settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Maximum number of scoring records retained after a trim.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Trim policy for the scoring history.
    #[serde(default)]
    pub history_trim: HistoryTrim,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            history_trim: HistoryTrim::default(),
        }
    }
}

/// Router settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Maximum number of routing decisions retained for statistics.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
        }
    }
}

fn default_history_capacity() -> usize {
    1000
}
