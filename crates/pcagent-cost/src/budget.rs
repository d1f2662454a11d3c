// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget tracking with daily, weekly, and monthly limits.
//!
//! The tracker keeps three calendar-anchored spend counters next to an
//! append-only ledger. Before every read or write it checks whether the
//! current day (midnight), week (Monday midnight), or month (1st, midnight)
//! has rolled over since the last check; a rollover zeroes only that
//! period's counter and moves its anchor forward.
//!
//! `from_ledger()` rebuilds the counters from previously persisted records
//! so budget enforcement survives process restarts.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use pcagent_config::model::BudgetConfig;
use pcagent_core::ModelTier;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::ledger::{ExpenseLedger, ExpenseRecord, HistoryWindow};

/// Snapshot of the budget after a rollover check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub daily_remaining: f64,
    pub weekly_remaining: f64,
    pub monthly_remaining: f64,
    pub daily_used: f64,
    pub weekly_used: f64,
    pub monthly_used: f64,
    /// Daily remaining is at or below the warning threshold.
    pub is_warning: bool,
    /// Daily remaining is at or below the critical threshold.
    pub is_critical: bool,
    /// Most binding of the three remaining values.
    pub remaining: f64,
}

/// Calendar anchors for the three budget periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PeriodAnchors {
    day: NaiveDate,
    week: NaiveDate,
    month: NaiveDate,
}

impl PeriodAnchors {
    fn at(now: NaiveDateTime) -> Self {
        let day = now.date();
        Self {
            day,
            week: week_start(day),
            month: month_start(day),
        }
    }
}

/// Monday of the ISO week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - TimeDelta::days(i64::from(day.weekday().num_days_from_monday()))
}

/// First day of the month containing `day`.
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// In-memory budget tracker with daily, weekly, and monthly limits.
pub struct BudgetTracker {
    daily_limit: f64,
    weekly_limit: f64,
    monthly_limit: f64,
    warning_threshold: f64,
    critical_threshold: f64,
    daily_spent: f64,
    weekly_spent: f64,
    monthly_spent: f64,
    anchors: PeriodAnchors,
    ledger: ExpenseLedger,
    clock: Arc<dyn Clock>,
}

impl BudgetTracker {
    /// Create a tracker on the system clock with zero spend.
    pub fn new(config: &BudgetConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a tracker reading time from `clock`.
    pub fn with_clock(config: &BudgetConfig, clock: Arc<dyn Clock>) -> Self {
        let anchors = PeriodAnchors::at(clock.now());
        info!(
            daily_limit = config.daily_limit,
            weekly_limit = config.weekly_limit,
            monthly_limit = config.monthly_limit,
            "budget tracker initialized"
        );
        Self {
            daily_limit: config.daily_limit,
            weekly_limit: config.weekly_limit,
            monthly_limit: config.monthly_limit,
            warning_threshold: config.warning_threshold,
            critical_threshold: config.critical_threshold,
            daily_spent: 0.0,
            weekly_spent: 0.0,
            monthly_spent: 0.0,
            anchors,
            ledger: ExpenseLedger::new(),
            clock,
        }
    }

    /// Create a tracker initialized from previously persisted records.
    ///
    /// All records go into the ledger; each period counter only sums the
    /// records at or after that period's current start.
    pub fn from_ledger(
        config: &BudgetConfig,
        records: Vec<ExpenseRecord>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut tracker = Self::with_clock(config, clock);
        let day_start = midnight(tracker.anchors.day);
        let week_start = midnight(tracker.anchors.week);
        let month_start = midnight(tracker.anchors.month);

        for record in records {
            let cost = sanitize_cost(record.cost);
            if record.timestamp >= day_start {
                tracker.daily_spent += cost;
            }
            if record.timestamp >= week_start {
                tracker.weekly_spent += cost;
            }
            if record.timestamp >= month_start {
                tracker.monthly_spent += cost;
            }
            tracker.ledger.append(ExpenseRecord { cost, ..record });
        }

        debug!(
            records = tracker.ledger.len(),
            daily = tracker.daily_spent,
            weekly = tracker.weekly_spent,
            monthly = tracker.monthly_spent,
            "budget tracker rehydrated from ledger"
        );
        tracker
    }

    /// Record a successful expense against all three periods.
    pub fn record_expense(&mut self, cost: f64, tier: ModelTier, description: &str) {
        self.record_outcome(cost, tier, description, true);
    }

    /// Record an expense with its outcome. Cost accrues regardless of `success`.
    ///
    /// Period rollovers are applied before the cost is added.
    pub fn record_outcome(&mut self, cost: f64, tier: ModelTier, description: &str, success: bool) {
        let now = self.clock.now();
        self.update_periods(now);

        let cost = sanitize_cost(cost);
        self.ledger
            .append(ExpenseRecord::new(now, tier, cost, description, success));

        self.daily_spent += cost;
        self.weekly_spent += cost;
        self.monthly_spent += cost;

        debug!(tier = %tier, cost, success, "recorded expense");
    }

    /// Re-evaluate period boundaries and report remaining headroom.
    pub fn check_budget_status(&mut self) -> BudgetStatus {
        let now = self.clock.now();
        self.update_periods(now);

        let daily_remaining = (self.daily_limit - self.daily_spent).max(0.0);
        let weekly_remaining = (self.weekly_limit - self.weekly_spent).max(0.0);
        let monthly_remaining = (self.monthly_limit - self.monthly_spent).max(0.0);

        let is_warning = daily_remaining <= self.warning_threshold;
        let is_critical = daily_remaining <= self.critical_threshold;

        if is_critical {
            warn!(daily_remaining, "Budget critical");
        } else if is_warning {
            warn!(daily_remaining, "Budget warning");
        }

        BudgetStatus {
            daily_remaining,
            weekly_remaining,
            monthly_remaining,
            daily_used: self.daily_spent,
            weekly_used: self.weekly_spent,
            monthly_used: self.monthly_spent,
            is_warning,
            is_critical,
            remaining: daily_remaining.min(weekly_remaining).min(monthly_remaining),
        }
    }

    /// Overall remaining budget (the most binding period).
    pub fn get_remaining_budget(&mut self) -> f64 {
        self.check_budget_status().remaining
    }

    /// Whether `estimated_cost` fits within the overall remaining budget.
    pub fn can_afford(&mut self, estimated_cost: f64) -> bool {
        self.check_budget_status().remaining >= estimated_cost
    }

    /// Sum of every recorded cost in the ledger.
    pub fn get_total_expenses(&self) -> f64 {
        self.ledger.total()
    }

    /// Ledger records within a rolling window back from now.
    ///
    /// Windows are 24h/7d/30d lookbacks, not the calendar periods used for
    /// the spend counters.
    pub fn get_expense_history(&self, window: HistoryWindow) -> Vec<ExpenseRecord> {
        self.ledger.since(window.cutoff(self.clock.now()))
    }

    /// Total cost per tier over the full ledger.
    pub fn get_model_expense_breakdown(&self) -> BTreeMap<ModelTier, f64> {
        self.ledger.breakdown()
    }

    /// Override the daily limit, e.g. for a single orchestrated execution.
    pub fn set_daily_limit(&mut self, limit: f64) {
        info!(old = self.daily_limit, new = limit, "daily budget limit overridden");
        self.daily_limit = limit;
    }

    /// Clear the ledger and all counters, re-anchoring every period to now.
    pub fn reset_budgets(&mut self) {
        self.ledger.clear();
        self.daily_spent = 0.0;
        self.weekly_spent = 0.0;
        self.monthly_spent = 0.0;
        self.anchors = PeriodAnchors::at(self.clock.now());
        info!("all budgets reset");
    }

    /// Read access to the underlying ledger.
    pub fn ledger(&self) -> &ExpenseLedger {
        &self.ledger
    }

    /// Current daily spend (for testing/reporting).
    pub fn daily_total(&self) -> f64 {
        self.daily_spent
    }

    /// Current weekly spend (for testing/reporting).
    pub fn weekly_total(&self) -> f64 {
        self.weekly_spent
    }

    /// Current monthly spend (for testing/reporting).
    pub fn monthly_total(&self) -> f64 {
        self.monthly_spent
    }

    /// Advance any period whose boundary has moved past its anchor.
    ///
    /// Anchors only move forward; a clock that steps backwards leaves them
    /// (and the counters) untouched.
    fn update_periods(&mut self, now: NaiveDateTime) {
        let current = PeriodAnchors::at(now);

        if current.day > self.anchors.day {
            self.daily_spent = 0.0;
            self.anchors.day = current.day;
            info!(day = %current.day, "new day started, resetting daily budget");
        }

        if current.week > self.anchors.week {
            self.weekly_spent = 0.0;
            self.anchors.week = current.week;
            info!(week = %current.week, "new week started, resetting weekly budget");
        }

        if current.month > self.anchors.month {
            self.monthly_spent = 0.0;
            self.anchors.month = current.month;
            info!(month = %current.month, "new month started, resetting monthly budget");
        }
    }
}

/// Clamp negative or non-finite costs to zero so counters never go negative.
fn sanitize_cost(cost: f64) -> f64 {
    if cost.is_finite() && cost >= 0.0 {
        cost
    } else {
        warn!(cost, "ignoring invalid expense amount, recording 0");
        0.0
    }
}
