// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the routing crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Execution backend tiers, ordered from most to least capable.
///
/// `Rule` is the unconditional zero-cost fallback and is always available.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Highest capability, highest cost.
    Premium,
    /// Mid-range hosted model.
    Mid,
    /// Open-weight model, usually self-hosted.
    Open,
    /// Deterministic rule-based executor. Always enabled, never billed.
    Rule,
}

impl ModelTier {
    /// Whether usage of this tier is billed against the budget.
    pub fn is_billable(self) -> bool {
        !matches!(self, ModelTier::Rule)
    }
}

/// Named complexity features extracted from a subtask description.
///
/// Snake-case names double as keys of the `complexity_weights` config table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    WordCount,
    AppCount,
    HasInterAppDependency,
    RequiresTextProcessing,
    RequiresNavigation,
    RequiresDataManipulation,
    StepCountEstimate,
    HasConditionalLogic,
    /// Context: past success rate on similar subtasks. Inverted when normalized.
    HistoricalSuccessRate,
    /// Context: complexity of similar past subtasks.
    SimilarTasksComplexity,
    /// Context: skill level of the requesting user.
    UserSkillLevel,
}

/// Truncate `text` to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
