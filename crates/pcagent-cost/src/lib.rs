// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost tracking, budget enforcement, and pricing for the PC-Agent router.
//!
//! This crate provides:
//! - **Expense ledger**: Append-only record of every billed backend call
//! - **Budget tracker**: Calendar-anchored daily/weekly/monthly limits with warning and critical levels
//! - **Clock**: Injectable time source so period rollovers are testable
//! - **Pricing**: Word-based token estimation for per-1k-token tiers

pub mod budget;
pub mod clock;
pub mod ledger;
pub mod pricing;

pub use budget::{BudgetStatus, BudgetTracker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{ExpenseLedger, ExpenseRecord, HistoryWindow};
