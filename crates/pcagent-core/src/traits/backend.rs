// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend handle trait for execution backends (premium, mid, open, rule).

use crate::error::PcAgentError;
use crate::types::ModelTier;

/// A routable execution backend.
///
/// Backends are black boxes with a cost function and a synchronous
/// text-in/text-out contract. Real model clients live outside this
/// workspace and plug in through this trait.
pub trait BackendHandle: Send + Sync + 'static {
    /// Human-readable name of the backing model (e.g. "gpt-4o").
    fn name(&self) -> &str;

    /// The tier this backend serves.
    fn tier(&self) -> ModelTier;

    /// Estimated cost in currency units of running `input` through this backend.
    fn estimate_cost(&self, input: &str) -> f64;

    /// Run `input` through the backend.
    ///
    /// Fails with [`PcAgentError::Backend`] when the backend cannot produce a result.
    fn invoke(&self, input: &str) -> Result<String, PcAgentError>;
}
