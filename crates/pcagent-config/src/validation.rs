// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Hard errors cover values no router can work with (negative budgets,
//! thresholds outside [0,1]). Orderings that only make routing odd, such as
//! `premium < mid`, are reported as advisory warnings instead.

use std::collections::HashSet;

use pcagent_core::{Feature, ModelTier};
use strum::IntoEnumIterator;

use crate::diagnostic::{ConfigError, suggest_key};
use crate::model::PcAgentConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PcAgentConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let thresholds = [
        ("premium", config.thresholds.premium),
        ("mid", config.thresholds.mid),
        ("open", config.thresholds.open),
    ];
    for (name, value) in thresholds {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("thresholds.{name} must be between 0 and 1, got {value}"),
            });
        }
    }

    let budget = &config.budget;
    let budget_values = [
        ("daily_limit", budget.daily_limit),
        ("weekly_limit", budget.weekly_limit),
        ("monthly_limit", budget.monthly_limit),
        ("warning_threshold", budget.warning_threshold),
        ("critical_threshold", budget.critical_threshold),
    ];
    for (name, value) in budget_values {
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigError::Validation {
                message: format!("budget.{name} must be a non-negative number, got {value}"),
            });
        }
    }

    for (tier, model) in &config.models {
        if !model.cost_per_unit.is_finite() || model.cost_per_unit < 0.0 {
            errors.push(ConfigError::Validation {
                message: format!(
                    "models.{tier}.cost_per_unit must be non-negative, got {}",
                    model.cost_per_unit
                ),
            });
        }
        if let Some(floor) = model.min_cost_per_call {
            if !floor.is_finite() || floor < 0.0 {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "models.{tier}.min_cost_per_call must be non-negative, got {floor}"
                    ),
                });
            }
        }
    }

    for (feature, weight) in &config.complexity_weights {
        if !weight.is_finite() || *weight < 0.0 {
            errors.push(ConfigError::Validation {
                message: format!("complexity_weights.{feature} must be non-negative, got {weight}"),
            });
        }
    }

    if config.scoring.history_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "scoring.history_capacity must be at least 1".to_string(),
        });
    }

    if config.routing.history_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "routing.history_capacity must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Collect advisory warnings for settings that are legal but make routing odd.
pub fn config_warnings(config: &PcAgentConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let t = &config.thresholds;

    if t.premium < t.mid || t.mid < t.open {
        warnings.push(format!(
            "thresholds should satisfy premium >= mid >= open (got premium={}, mid={}, open={})",
            t.premium, t.mid, t.open
        ));
    }

    if config.budget.critical_threshold > config.budget.warning_threshold {
        warnings.push(format!(
            "budget.critical_threshold ({}) exceeds budget.warning_threshold ({}); \
             critical status will be reported without a prior warning",
            config.budget.critical_threshold, config.budget.warning_threshold
        ));
    }

    let order = &config.fallback.fallback_order;
    if !order.contains(&ModelTier::Rule) {
        warnings.push("fallback.fallback_order does not include `rule`".to_string());
    }

    let mut seen = HashSet::new();
    for tier in order {
        if !seen.insert(tier) {
            warnings.push(format!("fallback.fallback_order lists `{tier}` more than once"));
        }
    }

    let known = known_features();
    for name in config.complexity_weights.keys() {
        if !known.contains(name) {
            let names: Vec<&str> = known.iter().map(String::as_str).collect();
            let hint = suggest_key(name, &names)
                .map(|s| format!(" (did you mean `{s}`?)"))
                .unwrap_or_default();
            warnings.push(format!(
                "complexity_weights.{name} does not name a known feature and will be ignored{hint}"
            ));
        }
    }

    warnings
}

/// Config names of every feature the complexity scorer extracts.
pub fn known_features() -> Vec<String> {
    Feature::iter().map(|feature| feature.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = PcAgentConfig::default();
        assert!(validate_config(&config).is_ok());
        assert!(config_warnings(&config).is_empty());
    }

    #[test]
    fn threshold_out_of_range_fails_validation() {
        let mut config = PcAgentConfig::default();
        config.thresholds.premium = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "thresholds.premium"));
    }

    #[test]
    fn negative_budget_fails_validation() {
        let mut config = PcAgentConfig::default();
        config.budget.daily_limit = -5.0;
        config.budget.critical_threshold = f64::NAN;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_message(&errors, "budget.daily_limit"));
        assert!(has_message(&errors, "budget.critical_threshold"));
    }

    #[test]
    fn negative_model_cost_fails_validation() {
        let mut config = PcAgentConfig::default();
        if let Some(mid) = config.models.get_mut(&ModelTier::Mid) {
            mid.cost_per_unit = -1.0;
            mid.min_cost_per_call = Some(-0.1);
        }
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "models.mid.cost_per_unit"));
        assert!(has_message(&errors, "models.mid.min_cost_per_call"));
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let mut config = PcAgentConfig::default();
        config.scoring.history_capacity = 0;
        config.routing.history_capacity = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unordered_thresholds_warn_but_validate() {
        let mut config = PcAgentConfig::default();
        config.thresholds.premium = 0.3;
        config.thresholds.mid = 0.6;
        assert!(validate_config(&config).is_ok());
        let warnings = config_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("premium >= mid >= open")));
    }

    #[test]
    fn critical_above_warning_is_flagged() {
        let mut config = PcAgentConfig::default();
        config.budget.critical_threshold = 3.0;
        let warnings = config_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("critical_threshold")));
    }

    #[test]
    fn fallback_order_problems_are_flagged() {
        let mut config = PcAgentConfig::default();
        config.fallback.fallback_order = vec![ModelTier::Mid, ModelTier::Mid];
        let warnings = config_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("does not include `rule`")));
        assert!(warnings.iter().any(|w| w.contains("more than once")));
    }

    #[test]
    fn unknown_weight_name_is_flagged() {
        let mut config = PcAgentConfig::default();
        config.complexity_weights.insert("app_cnt".to_string(), 0.4);
        config.complexity_weights.insert("app_count".to_string(), 0.4);
        let warnings = config_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("app_cnt"));
        assert!(warnings[0].contains("did you mean `app_count`"));
    }

    #[test]
    fn known_features_follow_the_feature_enum() {
        let known = known_features();
        assert_eq!(known.len(), Feature::iter().count());
        assert!(known.iter().any(|n| n == "has_inter_app_dependency"));
        assert!(known.iter().any(|n| n == "user_skill_level"));

        let mut config = PcAgentConfig::default();
        for name in &known {
            config.complexity_weights.insert(name.clone(), 0.1);
        }
        assert!(config_warnings(&config).is_empty());
    }
}
