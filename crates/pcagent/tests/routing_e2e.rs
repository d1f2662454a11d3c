// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end routing tests.
//!
//! Each test builds an isolated TestRouter over mock backends and a manual
//! clock, then drives the select, execute, feedback cycle.

use chrono::{NaiveDate, TimeDelta};
use pcagent_core::ModelTier;
use pcagent_cost::HistoryWindow;
use pcagent_test_utils::TestRouter;

const COMPLEX: &str =
    "Copy the data from Excel to Word, then format the table and calculate the sum if needed.";

// ---- Tier selection and billing ----

#[test]
fn complex_subtask_runs_on_premium_and_is_billed() {
    let router = TestRouter::builder().build();

    let outcome = router.run(COMPLEX);
    assert!(outcome.succeeded());
    assert!(!outcome.degraded());
    assert_eq!(outcome.tier, ModelTier::Premium);
    assert_eq!(outcome.result.unwrap(), "mock premium response");

    let premium = router.mock(ModelTier::Premium).unwrap();
    assert_eq!(premium.invocations(), vec![COMPLEX.to_string()]);

    let stats = router.agent.get_routing_stats();
    assert_eq!(stats.total_decisions, 1);
    assert!((stats.budget_used - 0.015).abs() < 1e-12);
}

#[test]
fn simple_subtask_stays_on_rule_for_free() {
    let router = TestRouter::builder().build();

    let outcome = router.run("open chrome");
    assert_eq!(outcome.tier, ModelTier::Rule);
    assert!(outcome.succeeded());
    assert!(router.agent.expense_history(HistoryWindow::All).is_empty());
    assert_eq!(router.mock(ModelTier::Premium).unwrap().invocation_count(), 0);
}

// ---- Degradation ----

#[test]
fn failing_premium_degrades_to_mid_and_bills_both() {
    let router = TestRouter::builder()
        .with_failing_tier(ModelTier::Premium)
        .build();

    let outcome = router.run(COMPLEX);
    assert!(outcome.succeeded());
    assert!(outcome.degraded());
    assert_eq!(outcome.attempted, vec![ModelTier::Premium, ModelTier::Mid]);

    let breakdown = router.agent.expense_breakdown();
    assert!((breakdown[&ModelTier::Premium] - 0.015).abs() < 1e-12);
    assert!((breakdown[&ModelTier::Mid] - 0.008).abs() < 1e-12);

    let premium = router.agent.tier_performance(ModelTier::Premium);
    assert_eq!((premium.successes, premium.failures), (0, 1));
}

#[test]
fn disabled_tier_is_never_selected() {
    let router = TestRouter::builder()
        .without_tier(ModelTier::Premium)
        .build();

    let outcome = router.run(COMPLEX);
    assert_eq!(outcome.attempted[0], ModelTier::Mid);
    assert!(router.mock(ModelTier::Premium).is_none());
}

// ---- Budget pressure ----

#[test]
fn shrinking_daily_budget_walks_down_the_tiers() {
    // 0.02 is below the critical threshold from the start, so premium is out.
    let router = TestRouter::builder().with_daily_budget(0.02).build();

    let tiers: Vec<ModelTier> = (0..4).map(|_| router.run(COMPLEX).tier).collect();
    assert_eq!(
        tiers,
        vec![ModelTier::Mid, ModelTier::Mid, ModelTier::Mid, ModelTier::Rule]
    );

    let status = router.agent.budget_status();
    assert!(status.is_critical);
    assert_eq!(status.remaining, 0.0);
    assert!((status.daily_used - 0.024).abs() < 1e-12);
}

#[test]
fn weekly_limit_resets_on_monday() {
    let mut config = pcagent_config::PcAgentConfig::default();
    config.budget.weekly_limit = 0.02;
    let router = TestRouter::builder().with_config(config).build();

    assert_eq!(router.run(COMPLEX).tier, ModelTier::Premium);
    // 0.005 left still clears the affordability floor.
    assert_eq!(router.run(COMPLEX).tier, ModelTier::Premium);
    // Week overspent: nothing priced is affordable.
    assert_eq!(router.run(COMPLEX).tier, ModelTier::Rule);
    assert_eq!(router.agent.budget_status().weekly_remaining, 0.0);

    // Wednesday 2026-03-04 -> Monday 2026-03-09
    router.clock.advance(TimeDelta::days(5));
    assert_eq!(router.run(COMPLEX).tier, ModelTier::Premium);

    let today = router.agent.expense_history(HistoryWindow::Day);
    assert_eq!(today.len(), 1);
    assert!((router.agent.budget_status().weekly_used - 0.015).abs() < 1e-12);
}

#[test]
fn month_rollover_keeps_expense_history() {
    let start = NaiveDate::from_ymd_opt(2026, 3, 31)
        .and_then(|d| d.and_hms_opt(23, 0, 0))
        .unwrap();
    let router = TestRouter::builder().starting_at(start).build();

    router.run(COMPLEX);
    router.clock.advance(TimeDelta::hours(2));
    router.run(COMPLEX);

    let status = router.agent.budget_status();
    assert!((status.monthly_used - 0.015).abs() < 1e-12);
    assert!((status.weekly_used - 0.03).abs() < 1e-12);
    assert_eq!(router.agent.expense_history(HistoryWindow::All).len(), 2);
}

// ---- Statistics ----

#[test]
fn routing_stats_reflect_mixed_workload() {
    let router = TestRouter::builder().build();
    router.run("open chrome");
    router.run("click the save button");
    router.run(COMPLEX);
    router.run(COMPLEX);

    let stats = router.agent.get_routing_stats();
    assert_eq!(stats.total_decisions, 4);
    assert_eq!(stats.retained_decisions, 4);
    assert!((stats.model_distribution[&ModelTier::Rule] - 0.5).abs() < 1e-12);
    assert!((stats.model_distribution[&ModelTier::Premium] - 0.5).abs() < 1e-12);
    assert!((stats.budget_used - 0.03).abs() < 1e-12);
    assert!((stats.budget_remaining - 9.97).abs() < 1e-9);
}
