// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic subtask complexity scoring.
//!
//! Scores a subtask description into [0,1] from keyword and regex signals,
//! optionally blended with caller-supplied context. Scoring is pure and
//! local: no model call, no network, no latency.
//!
//! Pipeline:
//! 1. Extract features from the lower-cased description.
//! 2. Merge context features (neutral 0.5 when a context field is absent).
//! 3. Normalize each feature to [0,1] and take the weighted mean over the
//!    features actually present.
//! 4. Squash with a logistic curve centered at 0.5 (steepness 10), clip.

use std::collections::{BTreeMap, VecDeque};
use std::str::FromStr;
use std::sync::LazyLock;

use pcagent_config::model::{HistoryTrim, PcAgentConfig};
pub use pcagent_core::Feature;
use pcagent_core::ModelTier;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Raw value of an extracted feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Count(usize),
    Flag(bool),
    Ratio(f64),
}

/// Feature set extracted from one description.
pub type ComplexityFeatures = BTreeMap<Feature, FeatureValue>;

/// Optional caller-supplied context. Absent fields are neutral (0.5).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringContext {
    pub historical_success_rate: Option<f64>,
    pub similar_tasks_complexity: Option<f64>,
    pub user_skill_level: Option<f64>,
}

/// One scoring call, kept for later inspection and calibration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringRecord {
    pub description: String,
    pub features: ComplexityFeatures,
    pub score: f64,
    pub context: Option<ScoringContext>,
}

/// Success/failure tally for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierPerformance {
    pub successes: u64,
    pub failures: u64,
}

impl TierPerformance {
    /// Fraction of successful outcomes, `None` before any feedback.
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.successes + self.failures;
        (total > 0).then(|| self.successes as f64 / total as f64)
    }
}

/// Neutral value for absent or malformed context features.
const NEUTRAL: f64 = 0.5;

/// Logistic steepness.
const STEEPNESS: f64 = 10.0;

const DEFAULT_WEIGHTS: &[(Feature, f64)] = &[
    (Feature::WordCount, 0.1),
    (Feature::AppCount, 0.2),
    (Feature::HasInterAppDependency, 0.3),
    (Feature::RequiresTextProcessing, 0.15),
    (Feature::RequiresNavigation, 0.1),
    (Feature::RequiresDataManipulation, 0.2),
    (Feature::StepCountEstimate, 0.15),
    (Feature::HasConditionalLogic, 0.25),
    (Feature::HistoricalSuccessRate, 0.2),
];

/// Desktop applications recognized in descriptions.
const APPS: &[&str] = &[
    "chrome",
    "word",
    "excel",
    "notepad",
    "calculator",
    "outlook",
    "explorer",
    "paint",
    "powerpoint",
];

const TEXT_PROCESSING: &[&str] = &[
    "edit",
    "format",
    "bold",
    "italic",
    "underline",
    "align",
    "paragraph",
    "font",
    "style",
];

const NAVIGATION: &[&str] = &[
    "open", "close", "navigate", "go to", "click", "select", "find", "search", "browse",
];

const DATA_MANIPULATION: &[&str] = &[
    "calculate", "sum", "average", "sort", "filter", "analyze", "graph", "chart", "formula",
    "function",
];

const ACTION_VERBS: &[&str] = &[
    "click", "type", "open", "close", "save", "create", "delete", "move", "copy", "paste",
];

const CONDITIONAL: &[&str] = &[
    "if",
    "then",
    "else",
    "when",
    "unless",
    "depending on",
    "based on",
    "condition",
];

/// Patterns signalling that data flows between applications.
static INTER_APP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"from.*to.*",
        r"copy.*from.*to.*",
        r"import.*into.*",
        r"export.*from.*to.*",
        r"search.*and.*create.*",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SENTENCE_DELIMITERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn count_present(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

/// Weighted heuristic complexity scorer with an in-memory scoring history.
pub struct ComplexityScorer {
    weights: BTreeMap<Feature, f64>,
    history: VecDeque<ScoringRecord>,
    history_capacity: usize,
    history_trim: HistoryTrim,
    performance: BTreeMap<ModelTier, TierPerformance>,
}

impl ComplexityScorer {
    /// Create a scorer with default weights overlaid by `config.complexity_weights`.
    ///
    /// Unknown feature names and negative or non-finite weights are ignored
    /// with a warning.
    pub fn new(config: &PcAgentConfig) -> Self {
        let mut weights: BTreeMap<Feature, f64> = DEFAULT_WEIGHTS.iter().copied().collect();

        for (name, &weight) in &config.complexity_weights {
            let Ok(feature) = Feature::from_str(name) else {
                warn!(feature = name.as_str(), "ignoring weight for unknown feature");
                continue;
            };
            if !weight.is_finite() || weight < 0.0 {
                warn!(feature = name.as_str(), weight, "ignoring invalid feature weight");
                continue;
            }
            weights.insert(feature, weight);
        }

        info!(features = weights.len(), "complexity scorer initialized");
        Self {
            weights,
            history: VecDeque::new(),
            history_capacity: config.scoring.history_capacity.max(1),
            history_trim: config.scoring.history_trim,
            performance: BTreeMap::new(),
        }
    }

    /// Score `description` in [0,1] and append a record to the history.
    ///
    /// Never fails; absent or malformed context degrades to neutral values.
    pub fn calculate_complexity(
        &mut self,
        description: &str,
        context: Option<&ScoringContext>,
    ) -> f64 {
        let features = self.extract_features(description, context);
        let weighted = self.weighted_score(&features);
        let score = sigmoid(weighted).clamp(0.0, 1.0);

        debug!(
            complexity = score,
            subtask = %pcagent_core::truncate_chars(description, 50),
            "complexity scored"
        );

        self.history.push_back(ScoringRecord {
            description: description.to_string(),
            features,
            score,
            context: context.cloned(),
        });
        if self.history_trim == HistoryTrim::OnEveryScore {
            self.trim_history();
        }

        score
    }

    /// Extract the feature set for `description`.
    ///
    /// Context features are added only when a context is supplied.
    pub fn extract_features(
        &self,
        description: &str,
        context: Option<&ScoringContext>,
    ) -> ComplexityFeatures {
        let lower = description.to_lowercase();

        let mut features = ComplexityFeatures::new();
        features.insert(
            Feature::WordCount,
            FeatureValue::Count(description.split_whitespace().count()),
        );
        features.insert(Feature::AppCount, FeatureValue::Count(count_present(&lower, APPS)));
        features.insert(
            Feature::HasInterAppDependency,
            FeatureValue::Flag(INTER_APP_PATTERNS.iter().any(|re| re.is_match(&lower))),
        );
        features.insert(
            Feature::RequiresTextProcessing,
            FeatureValue::Flag(contains_any(&lower, TEXT_PROCESSING)),
        );
        features.insert(
            Feature::RequiresNavigation,
            FeatureValue::Flag(contains_any(&lower, NAVIGATION)),
        );
        features.insert(
            Feature::RequiresDataManipulation,
            FeatureValue::Flag(contains_any(&lower, DATA_MANIPULATION)),
        );
        features.insert(
            Feature::StepCountEstimate,
            FeatureValue::Count(estimate_step_count(&lower)),
        );
        features.insert(
            Feature::HasConditionalLogic,
            FeatureValue::Flag(contains_any(&lower, CONDITIONAL)),
        );

        if let Some(ctx) = context {
            features.insert(
                Feature::HistoricalSuccessRate,
                FeatureValue::Ratio(context_ratio(ctx.historical_success_rate)),
            );
            features.insert(
                Feature::SimilarTasksComplexity,
                FeatureValue::Ratio(context_ratio(ctx.similar_tasks_complexity)),
            );
            features.insert(
                Feature::UserSkillLevel,
                FeatureValue::Ratio(context_ratio(ctx.user_skill_level)),
            );
        }

        features
    }

    /// Feed an execution outcome back into the scorer.
    ///
    /// Tallies the outcome per tier and trims the scoring history to capacity.
    pub fn update_model_performance(&mut self, description: &str, tier: ModelTier, success: bool) {
        let entry = self.performance.entry(tier).or_default();
        if success {
            entry.successes += 1;
        } else {
            entry.failures += 1;
        }
        info!(
            tier = %tier,
            success,
            subtask = %pcagent_core::truncate_chars(description, 50),
            "updating scorer with routing outcome"
        );
        self.trim_history();
    }

    /// Scoring records, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &ScoringRecord> {
        self.history.iter()
    }

    /// Number of retained scoring records.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Outcome tally for `tier`.
    pub fn performance(&self, tier: ModelTier) -> TierPerformance {
        self.performance.get(&tier).copied().unwrap_or_default()
    }

    /// Effective weight for `feature`, if any.
    pub fn weight(&self, feature: Feature) -> Option<f64> {
        self.weights.get(&feature).copied()
    }

    fn weighted_score(&self, features: &ComplexityFeatures) -> f64 {
        let mut score = 0.0;
        let mut total_weight = 0.0;

        for (feature, weight) in &self.weights {
            if let Some(value) = features.get(feature) {
                score += normalize(*feature, *value) * weight;
                total_weight += weight;
            }
        }

        if total_weight > 0.0 {
            score / total_weight
        } else {
            score
        }
    }

    /// Drop the oldest records beyond capacity.
    fn trim_history(&mut self) {
        let excess = self.history.len().saturating_sub(self.history_capacity);
        if excess > 0 {
            self.history.drain(..excess);
        }
    }
}

/// Larger of the sentence-delimited piece count and the action verbs present.
///
/// Splitting keeps the trailing empty piece, so "open chrome." counts two.
fn estimate_step_count(lower: &str) -> usize {
    let pieces = SENTENCE_DELIMITERS.split(lower).count();
    pieces.max(count_present(lower, ACTION_VERBS))
}

fn context_ratio(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => NEUTRAL,
    }
}

/// Map a feature value into [0,1].
fn normalize(feature: Feature, value: FeatureValue) -> f64 {
    match value {
        FeatureValue::Flag(flag) => {
            if flag {
                1.0
            } else {
                0.0
            }
        }
        FeatureValue::Count(n) => {
            let n = n as f64;
            match feature {
                Feature::WordCount => (n / 50.0).min(1.0),
                Feature::AppCount => (n / 5.0).min(1.0),
                Feature::StepCountEstimate => (n / 20.0).min(1.0),
                _ => n.min(1.0),
            }
        }
        FeatureValue::Ratio(v) if !v.is_finite() => NEUTRAL,
        FeatureValue::Ratio(v) => match feature {
            Feature::HistoricalSuccessRate => 1.0 - v,
            _ => v.min(1.0),
        },
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-STEEPNESS * (x - 0.5)).exp())
}
