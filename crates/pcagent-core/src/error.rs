// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the PC-Agent router.

use thiserror::Error;

use crate::types::ModelTier;

/// The primary error type shared by backends, configuration plumbing, and the CLI.
///
/// Routing decisions themselves never fail; this type only surfaces from
/// backend invocations and from the outer layers that load configuration.
#[derive(Debug, Error)]
pub enum PcAgentError {
    /// Configuration errors (unreadable file, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A backend failed to produce a result for the given input.
    #[error("backend error ({tier}): {message}")]
    Backend { tier: ModelTier, message: String },

    /// Caller supplied input that cannot be processed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PcAgentError {
    /// Shorthand for a backend failure on `tier`.
    pub fn backend(tier: ModelTier, message: impl Into<String>) -> Self {
        Self::Backend {
            tier,
            message: message.into(),
        }
    }

    /// The tier that failed, if this is a backend error.
    pub fn failed_tier(&self) -> Option<ModelTier> {
        match self {
            Self::Backend { tier, .. } => Some(*tier),
            _ => None,
        }
    }
}
