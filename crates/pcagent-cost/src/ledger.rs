// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only in-memory expense ledger.
//!
//! Every billed backend call is recorded as an [`ExpenseRecord`]. Records are
//! immutable once appended and only disappear through [`ExpenseLedger::clear`].
//! Persisting the ledger is left to the caller; records are serde-serializable.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};
use pcagent_core::{ModelTier, truncate_chars};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum number of characters of task description kept per record.
pub const MAX_DESCRIPTION_CHARS: usize = 100;

/// A single expense: one backend call charged against the budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Local time the expense was recorded.
    pub timestamp: NaiveDateTime,
    /// Tier that incurred the cost.
    pub tier: ModelTier,
    /// Non-negative cost in currency units.
    pub cost: f64,
    /// Task description, truncated to [`MAX_DESCRIPTION_CHARS`].
    pub task_description: String,
    /// Whether the call achieved its goal. Cost accrues either way.
    pub success: bool,
}

impl ExpenseRecord {
    /// Create a record, truncating the description.
    pub fn new(
        timestamp: NaiveDateTime,
        tier: ModelTier,
        cost: f64,
        task_description: &str,
        success: bool,
    ) -> Self {
        Self {
            timestamp,
            tier,
            cost,
            task_description: truncate_chars(task_description, MAX_DESCRIPTION_CHARS),
            success,
        }
    }
}

/// Rolling lookback window for expense history queries.
///
/// These are plain durations back from "now" (24h, 7d, 30d) and deliberately
/// differ from the calendar-anchored periods used for budget accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HistoryWindow {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
    /// Entire ledger.
    All,
}

impl HistoryWindow {
    /// Earliest timestamp included in the window, or `None` for no cutoff.
    pub fn cutoff(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            HistoryWindow::Day => Some(now - TimeDelta::days(1)),
            HistoryWindow::Week => Some(now - TimeDelta::weeks(1)),
            HistoryWindow::Month => Some(now - TimeDelta::days(30)),
            HistoryWindow::All => None,
        }
    }
}

/// Append-only list of expense records.
#[derive(Debug, Clone, Default)]
pub struct ExpenseLedger {
    records: Vec<ExpenseRecord>,
}

impl ExpenseLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn append(&mut self, record: ExpenseRecord) {
        self.records.push(record);
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    /// Records with `timestamp >= cutoff`; all records when `cutoff` is `None`.
    pub fn since(&self, cutoff: Option<NaiveDateTime>) -> Vec<ExpenseRecord> {
        self.records
            .iter()
            .filter(|r| cutoff.is_none_or(|c| r.timestamp >= c))
            .cloned()
            .collect()
    }

    /// Sum of all recorded costs.
    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| r.cost).sum()
    }

    /// Total cost per tier.
    pub fn breakdown(&self) -> BTreeMap<ModelTier, f64> {
        let mut breakdown = BTreeMap::new();
        for record in &self.records {
            *breakdown.entry(record.tier).or_insert(0.0) += record.cost;
        }
        breakdown
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
