// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pcagent.toml` > `~/.config/pcagent/pcagent.toml` > `/etc/pcagent/pcagent.toml`
//! with environment variable overrides via `PCAGENT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map, Value},
};

use crate::model::PcAgentConfig;

/// Top-level sections whose keys may themselves contain underscores.
const SECTIONS: &[&str] = &[
    "complexity_weights",
    "thresholds",
    "fallback",
    "scoring",
    "routing",
    "budget",
    "agent",
];

/// Tier names accepted under `models.`.
const TIERS: &[&str] = &["premium", "mid", "open", "rule"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pcagent/pcagent.toml` (system-wide)
/// 3. `~/.config/pcagent/pcagent.toml` (user XDG config)
/// 4. `./pcagent.toml` (local directory)
/// 5. `PCAGENT_*` environment variables
pub fn load_config() -> Result<PcAgentConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over compiled defaults (no XDG lookup).
pub fn load_config_from_str(toml_content: &str) -> Result<PcAgentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PcAgentConfig::default()))
        .merge(LegacyKeys(Toml::string(toml_content)))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PcAgentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PcAgentConfig::default()))
        .merge(LegacyKeys(Toml::file(path)))
        .merge(LegacyKeys(env_provider()))
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PcAgentConfig::default()))
        .merge(LegacyKeys(Toml::file("/etc/pcagent/pcagent.toml")))
        .merge(LegacyKeys(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("pcagent/pcagent.toml"))
                .unwrap_or_default(),
        )))
        .merge(LegacyKeys(Toml::file("pcagent.toml")))
        .merge(LegacyKeys(env_provider()))
}

/// Provider adapter that renames legacy model keys before merging.
///
/// `cost_per_1k_tokens` becomes `cost_per_unit`. Applied per layer, since
/// the compiled defaults already carry `cost_per_unit`.
struct LegacyKeys<P>(P);

impl<P: Provider> Provider for LegacyKeys<P> {
    fn metadata(&self) -> Metadata {
        self.0.metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut data = self.0.data()?;
        for dict in data.values_mut() {
            rename_legacy_keys(dict);
        }
        Ok(data)
    }
}

fn rename_legacy_keys(dict: &mut Dict) {
    let Some(Value::Dict(_, models)) = dict.get_mut("models") else {
        return;
    };
    for model in models.values_mut() {
        if let Value::Dict(_, fields) = model {
            if let Some(cost) = fields.remove("cost_per_1k_tokens") {
                // An explicit `cost_per_unit` in the same layer wins.
                fields.entry("cost_per_unit".to_string()).or_insert(cost);
            }
        }
    }
}

/// Environment provider mapping `PCAGENT_SECTION_KEY` onto `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `PCAGENT_BUDGET_DAILY_LIMIT` must map to `budget.daily_limit`.
fn env_provider() -> Env {
    Env::prefixed("PCAGENT_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
///
/// `models_premium_cost_per_unit` -> `models.premium.cost_per_unit`,
/// `complexity_weights_app_count` -> `complexity_weights.app_count`.
/// Unrecognized names pass through unchanged.
pub fn map_env_key(key: &str) -> String {
    if let Some(rest) = key.strip_prefix("models_") {
        for tier in TIERS {
            if let Some(field) = rest.strip_prefix(tier).and_then(|r| r.strip_prefix('_')) {
                return format!("models.{tier}.{field}");
            }
        }
        return key.to_string();
    }

    for section in SECTIONS {
        if let Some(field) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{field}");
        }
    }

    key.to_string()
}
