// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier selection from a complexity score and a budget status.
//!
//! Evaluated in fixed priority order, first match wins:
//! 1. complexity > premium threshold, budget not critical, premium affordable -> premium
//! 2. complexity > mid threshold: mid if affordable, else premium if not critical and affordable
//! 3. complexity > open threshold: open if affordable, else rule
//! 4. rule
//!
//! "Affordable" is a headroom check: the tier is instantiated and the
//! remaining budget is at least its `min_cost_per_call` floor. The actual
//! cost of the pending call is not known at selection time.

use std::collections::BTreeMap;
use std::sync::Arc;

use pcagent_config::model::{ModelConfig, PcAgentConfig, ThresholdConfig};
use pcagent_core::{BackendHandle, ModelTier};
use pcagent_cost::BudgetStatus;
use tracing::{debug, info, warn};

use crate::backends::{BackendFactory, DefaultBackendFactory};

/// Display name used when the rule tier is absent from configuration.
const RULE_FALLBACK_NAME: &str = "rule-based";

/// Deterministic tier selector over an instantiated catalog.
pub struct ModelSelector {
    thresholds: ThresholdConfig,
    fallback_order: Vec<ModelTier>,
    /// Every configured tier, enabled or not.
    models: BTreeMap<ModelTier, ModelConfig>,
    /// Instantiated tiers only. Always contains `Rule`.
    backends: BTreeMap<ModelTier, Arc<dyn BackendHandle>>,
}

impl ModelSelector {
    /// Build the catalog with the default backend factory.
    pub fn new(config: &PcAgentConfig) -> Self {
        Self::with_factory(config, &DefaultBackendFactory)
    }

    /// Build the catalog, creating a backend for every enabled tier.
    ///
    /// The rule tier is instantiated even when absent or disabled, and is
    /// always priced at zero.
    pub fn with_factory(config: &PcAgentConfig, factory: &dyn BackendFactory) -> Self {
        let mut models = config.models.clone();

        let rule = models
            .entry(ModelTier::Rule)
            .or_insert_with(|| ModelConfig::new(RULE_FALLBACK_NAME, 0.0));
        if !rule.enabled {
            info!("rule tier disabled in configuration, enabling it as the unconditional fallback");
            rule.enabled = true;
        }
        if rule.cost_per_unit != 0.0 {
            warn!(
                cost = rule.cost_per_unit,
                "rule tier is never billed, ignoring configured cost"
            );
            rule.cost_per_unit = 0.0;
        }

        let mut backends = BTreeMap::new();
        for (tier, model) in &models {
            if model.enabled {
                backends.insert(*tier, factory.create(*tier, model));
                info!(tier = %tier, model = model.name.as_str(), "initialized model tier");
            }
        }

        Self {
            thresholds: config.thresholds.clone(),
            fallback_order: config.fallback.fallback_order.clone(),
            models,
            backends,
        }
    }

    /// Pick a tier for `complexity` under `status`. Never fails.
    pub fn select_model(
        &self,
        complexity: f64,
        status: &BudgetStatus,
    ) -> (ModelTier, Arc<dyn BackendHandle>) {
        let tier = self.choose_tier(complexity, status);
        debug!(
            complexity,
            tier = %tier,
            remaining = status.remaining,
            critical = status.is_critical,
            "model selected"
        );
        (tier, self.rule_or(tier))
    }

    fn choose_tier(&self, complexity: f64, status: &BudgetStatus) -> ModelTier {
        let thresholds = &self.thresholds;
        let remaining = status.remaining;
        let critical = status.is_critical;

        if complexity > thresholds.premium
            && !critical
            && self.can_afford(ModelTier::Premium, remaining)
        {
            return ModelTier::Premium;
        }

        if complexity > thresholds.mid {
            if self.can_afford(ModelTier::Mid, remaining) {
                return ModelTier::Mid;
            }
            if !critical && self.can_afford(ModelTier::Premium, remaining) {
                return ModelTier::Premium;
            }
        }

        if complexity > thresholds.open {
            if self.can_afford(ModelTier::Open, remaining) {
                return ModelTier::Open;
            }
            return ModelTier::Rule;
        }

        ModelTier::Rule
    }

    /// Whether `tier` is instantiated and `remaining` covers its floor.
    pub fn can_afford(&self, tier: ModelTier, remaining: f64) -> bool {
        if !self.backends.contains_key(&tier) {
            return false;
        }
        let floor = self
            .models
            .get(&tier)
            .map(ModelConfig::affordability_floor)
            .unwrap_or(pcagent_config::model::DEFAULT_MIN_COST_PER_CALL);
        remaining >= floor
    }

    /// Next tier after `current` in the fallback chain.
    ///
    /// `None` when `current` is absent from the chain or already last.
    pub fn fallback_model(&self, current: ModelTier) -> Option<ModelTier> {
        let index = self.fallback_order.iter().position(|t| *t == current)?;
        self.fallback_order.get(index + 1).copied()
    }

    /// Configured per-unit cost of `tier`, 0 when not configured.
    pub fn get_model_cost(&self, tier: ModelTier) -> f64 {
        self.models.get(&tier).map_or(0.0, |m| m.cost_per_unit)
    }

    /// Configuration of `tier`, enabled or not.
    pub fn get_model_info(&self, tier: ModelTier) -> Option<&ModelConfig> {
        self.models.get(&tier)
    }

    /// Instantiated tiers, most capable first.
    pub fn get_available_models(&self) -> Vec<ModelTier> {
        self.backends.keys().copied().collect()
    }

    /// Backend for an instantiated tier.
    pub fn backend(&self, tier: ModelTier) -> Option<Arc<dyn BackendHandle>> {
        self.backends.get(&tier).cloned()
    }

    /// The configured fallback chain.
    pub fn fallback_order(&self) -> &[ModelTier] {
        &self.fallback_order
    }

    fn rule_or(&self, tier: ModelTier) -> Arc<dyn BackendHandle> {
        match self.backends.get(&tier) {
            Some(backend) => Arc::clone(backend),
            None => self.rule_backend(),
        }
    }

    fn rule_backend(&self) -> Arc<dyn BackendHandle> {
        match self.backends.get(&ModelTier::Rule) {
            Some(backend) => Arc::clone(backend),
            None => Arc::new(crate::backends::RuleBackend::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(remaining: f64, is_critical: bool) -> BudgetStatus {
        BudgetStatus {
            daily_remaining: remaining,
            weekly_remaining: remaining,
            monthly_remaining: remaining,
            daily_used: 0.0,
            weekly_used: 0.0,
            monthly_used: 0.0,
            is_warning: is_critical,
            is_critical,
            remaining,
        }
    }

    fn selector() -> ModelSelector {
        ModelSelector::new(&PcAgentConfig::default())
    }

    fn selector_with(configure: impl FnOnce(&mut PcAgentConfig)) -> ModelSelector {
        let mut config = PcAgentConfig::default();
        configure(&mut config);
        ModelSelector::new(&config)
    }

    #[test]
    fn high_complexity_with_headroom_goes_premium() {
        let (tier, backend) = selector().select_model(0.85, &status(5.0, false));
        assert_eq!(tier, ModelTier::Premium);
        assert_eq!(backend.tier(), ModelTier::Premium);
        assert_eq!(backend.name(), "gpt-4o");
    }

    #[test]
    fn high_complexity_nearly_broke_falls_to_rule() {
        // Premium, mid, and open all need 0.001 of headroom.
        let (tier, _) = selector().select_model(0.85, &status(0.0005, false));
        assert_eq!(tier, ModelTier::Rule);
    }

    #[test]
    fn high_complexity_nearly_broke_uses_mid_when_its_floor_allows() {
        let s = selector_with(|c| {
            c.models.get_mut(&ModelTier::Mid).unwrap().min_cost_per_call = Some(0.0001);
        });
        let (tier, _) = s.select_model(0.85, &status(0.0005, false));
        assert_eq!(tier, ModelTier::Mid);
    }

    #[test]
    fn critical_budget_blocks_premium() {
        let (tier, _) = selector().select_model(0.95, &status(0.4, true));
        assert_eq!(tier, ModelTier::Mid);
    }

    #[test]
    fn mid_unaffordable_upgrades_to_premium_when_not_critical() {
        let s = selector_with(|c| {
            c.models.get_mut(&ModelTier::Mid).unwrap().min_cost_per_call = Some(3.0);
        });
        let (tier, _) = s.select_model(0.6, &status(1.0, false));
        assert_eq!(tier, ModelTier::Premium);

        // Same budget marked critical: no upgrade, open takes it.
        let (tier, _) = s.select_model(0.6, &status(1.0, true));
        assert_eq!(tier, ModelTier::Open);
    }

    #[test]
    fn moderate_complexity_goes_open_or_rule() {
        let s = selector();
        assert_eq!(s.select_model(0.3, &status(5.0, false)).0, ModelTier::Open);
        assert_eq!(s.select_model(0.3, &status(0.0, true)).0, ModelTier::Rule);
    }

    #[test]
    fn low_complexity_always_rule() {
        let s = selector();
        assert_eq!(s.select_model(0.2, &status(100.0, false)).0, ModelTier::Rule);
        assert_eq!(s.select_model(0.0, &status(100.0, false)).0, ModelTier::Rule);
    }

    #[test]
    fn thresholds_are_strict() {
        let s = selector();
        assert_eq!(s.select_model(0.8, &status(5.0, false)).0, ModelTier::Mid);
        assert_eq!(s.select_model(0.5, &status(5.0, false)).0, ModelTier::Open);
    }

    #[test]
    fn nan_complexity_routes_to_rule() {
        assert_eq!(
            selector().select_model(f64::NAN, &status(5.0, false)).0,
            ModelTier::Rule
        );
    }

    #[test]
    fn disabled_tier_is_never_selected() {
        let s = selector_with(|c| {
            c.models.get_mut(&ModelTier::Premium).unwrap().enabled = false;
        });
        assert_eq!(s.select_model(0.95, &status(5.0, false)).0, ModelTier::Mid);
        assert!(s.backend(ModelTier::Premium).is_none());
        // Configuration is still visible.
        assert_eq!(s.get_model_info(ModelTier::Premium).unwrap().name, "gpt-4o");
        assert!((s.get_model_cost(ModelTier::Premium) - 0.015).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_thresholds_still_return_catalog_tiers() {
        let s = selector_with(|c| {
            c.thresholds.premium = 0.2;
            c.thresholds.mid = 0.5;
            c.thresholds.open = 0.8;
        });
        // Premium wins first whenever it is affordable.
        assert_eq!(s.select_model(0.3, &status(5.0, false)).0, ModelTier::Premium);
        // Critical: premium branch skipped, 0.3 is not above mid or open.
        assert_eq!(s.select_model(0.3, &status(0.1, true)).0, ModelTier::Rule);
        assert_eq!(s.select_model(0.6, &status(0.1, true)).0, ModelTier::Mid);
    }

    #[test]
    fn rule_is_force_instantiated() {
        let s = selector_with(|c| {
            c.models.remove(&ModelTier::Rule);
            c.models.get_mut(&ModelTier::Open).unwrap().enabled = false;
        });
        let available = s.get_available_models();
        assert_eq!(
            available,
            vec![ModelTier::Premium, ModelTier::Mid, ModelTier::Rule]
        );
        let rule = s.backend(ModelTier::Rule).unwrap();
        assert_eq!(rule.name(), RULE_FALLBACK_NAME);
    }

    #[test]
    fn disabled_or_priced_rule_is_normalized() {
        let s = selector_with(|c| {
            let rule = c.models.get_mut(&ModelTier::Rule).unwrap();
            rule.enabled = false;
            rule.cost_per_unit = 0.5;
        });
        assert!(s.backend(ModelTier::Rule).is_some());
        assert_eq!(s.get_model_cost(ModelTier::Rule), 0.0);
    }

    #[test]
    fn only_rule_configured() {
        let s = selector_with(|c| {
            c.models.clear();
        });
        assert_eq!(s.get_available_models(), vec![ModelTier::Rule]);
        for complexity in [0.1, 0.3, 0.6, 0.9] {
            assert_eq!(
                s.select_model(complexity, &status(100.0, false)).0,
                ModelTier::Rule
            );
        }
        assert_eq!(s.get_model_cost(ModelTier::Premium), 0.0);
    }

    #[test]
    fn fallback_walks_configured_chain() {
        let s = selector();
        assert_eq!(s.fallback_model(ModelTier::Premium), Some(ModelTier::Mid));
        assert_eq!(s.fallback_model(ModelTier::Mid), Some(ModelTier::Open));
        assert_eq!(s.fallback_model(ModelTier::Open), Some(ModelTier::Rule));
        assert_eq!(s.fallback_model(ModelTier::Rule), None);
    }

    #[test]
    fn fallback_for_tier_missing_from_chain() {
        let s = selector_with(|c| {
            c.fallback.fallback_order = vec![ModelTier::Premium, ModelTier::Open];
        });
        assert_eq!(s.fallback_model(ModelTier::Mid), None);
        assert_eq!(s.fallback_model(ModelTier::Premium), Some(ModelTier::Open));
        assert_eq!(s.fallback_model(ModelTier::Open), None);

        let empty = selector_with(|c| c.fallback.fallback_order.clear());
        assert_eq!(empty.fallback_model(ModelTier::Premium), None);
    }

    #[test]
    fn explicit_floor_gates_affordability() {
        let s = selector_with(|c| {
            c.models.get_mut(&ModelTier::Premium).unwrap().min_cost_per_call = Some(2.0);
        });
        assert!(!s.can_afford(ModelTier::Premium, 1.99));
        assert!(s.can_afford(ModelTier::Premium, 2.0));
        assert_eq!(s.select_model(0.9, &status(1.0, false)).0, ModelTier::Mid);
    }

    proptest::proptest! {
        #[test]
        fn selection_always_from_catalog(
            complexity in -0.5f64..1.5,
            remaining in 0.0f64..20.0,
            critical in proptest::bool::ANY,
            premium_enabled in proptest::bool::ANY,
            mid_enabled in proptest::bool::ANY,
            open_enabled in proptest::bool::ANY,
        ) {
            let s = selector_with(|c| {
                c.models.get_mut(&ModelTier::Premium).unwrap().enabled = premium_enabled;
                c.models.get_mut(&ModelTier::Mid).unwrap().enabled = mid_enabled;
                c.models.get_mut(&ModelTier::Open).unwrap().enabled = open_enabled;
            });
            let (tier, backend) = s.select_model(complexity, &status(remaining, critical));
            proptest::prop_assert!(s.get_available_models().contains(&tier));
            proptest::prop_assert_eq!(backend.tier(), tier);
            if complexity <= 0.2 {
                proptest::prop_assert_eq!(tier, ModelTier::Rule);
            }
            if critical {
                proptest::prop_assert!(tier != ModelTier::Premium);
            }
        }
    }
}
