// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subtask complexity scoring and budget-aware tier routing for the PC-Agent.
//!
//! This crate provides:
//! - [`ComplexityScorer`]: Heuristic complexity estimation in [0,1] (zero-cost, zero-latency)
//! - [`ModelSelector`]: Deterministic tier selection with affordability checks and a fallback chain
//! - [`RouterAgent`]: Composition of scorer, budget tracker, and selector with routing statistics
//! - [`BackendFactory`]: Seam for plugging real model clients into the tier catalog
//! - [`execute_with_fallback`]: Caller-side degradation along the fallback chain
//!
//! The router sits in front of every subtask execution, choosing the
//! cheapest tier (premium/mid/open/rule) that can plausibly handle the
//! subtask given its complexity and the remaining budget.

pub mod agent;
pub mod backends;
pub mod execution;
pub mod scorer;
pub mod selector;

pub use agent::{RouterAgent, RoutingDecision, RoutingStats, SelectedModel};
pub use backends::{BackendFactory, DefaultBackendFactory, OfflineBackend, RuleBackend};
pub use execution::{ExecutionOutcome, execute_with_fallback};
pub use scorer::{
    ComplexityFeatures, ComplexityScorer, Feature, FeatureValue, ScoringContext, ScoringRecord,
    TierPerformance,
};
pub use selector::ModelSelector;
