// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token estimation and per-call cost calculation.
//!
//! Backends are priced per 1k tokens. Without a tokenizer the token count is
//! approximated from the whitespace-separated word count.

/// Approximate tokens produced per whitespace-separated word.
pub const TOKENS_PER_WORD: f64 = 1.3;

/// Estimate the token count of `input`.
pub fn estimate_tokens(input: &str) -> f64 {
    input.split_whitespace().count() as f64 * TOKENS_PER_WORD
}

/// Estimated cost of running `input` through a tier priced at `cost_per_1k` per 1k tokens.
///
/// Negative or non-finite prices are treated as free.
pub fn estimate_cost(input: &str, cost_per_1k: f64) -> f64 {
    if !cost_per_1k.is_finite() || cost_per_1k <= 0.0 {
        return 0.0;
    }
    estimate_tokens(input) * cost_per_1k / 1000.0
}
