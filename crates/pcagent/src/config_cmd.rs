// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pcagent config` command implementation.

use pcagent_config::PcAgentConfig;
use pcagent_core::PcAgentError;

/// Run the `pcagent config` command.
///
/// Reaching this point means the configuration loaded and validated; this
/// reports advisory warnings and optionally dumps the effective settings.
pub fn run_config(config: &PcAgentConfig, show: bool) -> Result<(), PcAgentError> {
    let warnings = pcagent_config::config_warnings(config);
    if warnings.is_empty() {
        println!("configuration OK");
    } else {
        println!("configuration OK with {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    if show {
        println!();
        print!("{}", effective_toml(config)?);
    }
    Ok(())
}

/// The effective configuration rendered as TOML.
pub fn effective_toml(config: &PcAgentConfig) -> Result<String, PcAgentError> {
    toml::to_string_pretty(config)
        .map_err(|e| PcAgentError::Config(format!("failed to render configuration: {e}")))
}
