// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pcagent simulate` command implementation.
//!
//! Routes every subtask in a file through a router whose priced tiers are
//! simulated backends with fixed success rates, executing each with
//! fallback. The report covers success rates overall and per tier, spend
//! per task, and savings against running every subtask on the premium tier.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use pcagent_config::PcAgentConfig;
use pcagent_config::model::ModelConfig;
use pcagent_core::{BackendHandle, ModelTier, PcAgentError};
use pcagent_cost::{BudgetStatus, SystemClock, pricing};
use pcagent_router::{
    BackendFactory, RouterAgent, RoutingStats, RuleBackend, execute_with_fallback,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{debug, info};

/// Threshold preset applied on top of the loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Default thresholds: premium 0.8, mid 0.5, open 0.2.
    Balanced,
    /// Raised thresholds that keep more work on cheap tiers.
    CostSaving,
    /// Lowered thresholds that favor capable tiers.
    Performance,
}

impl SimulationMode {
    /// Premium, mid and open thresholds for this preset.
    pub fn thresholds(self) -> (f64, f64, f64) {
        match self {
            SimulationMode::Balanced => (0.8, 0.5, 0.2),
            SimulationMode::CostSaving => (0.9, 0.7, 0.4),
            SimulationMode::Performance => (0.6, 0.3, 0.1),
        }
    }

    fn apply(self, config: &PcAgentConfig) -> PcAgentConfig {
        let mut config = config.clone();
        let (premium, mid, open) = self.thresholds();
        config.thresholds.premium = premium;
        config.thresholds.mid = mid;
        config.thresholds.open = open;
        config
    }
}

/// Probability that a simulated call on `tier` succeeds.
fn success_rate(tier: ModelTier) -> f64 {
    match tier {
        ModelTier::Premium => 0.85,
        ModelTier::Mid => 0.75,
        ModelTier::Open => 0.65,
        ModelTier::Rule => 1.0,
    }
}

/// A priced tier whose calls succeed at random.
struct SimulatedBackend {
    tier: ModelTier,
    name: String,
    cost_per_unit: f64,
    rng: Arc<Mutex<StdRng>>,
}

impl BackendHandle for SimulatedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ModelTier {
        self.tier
    }

    fn estimate_cost(&self, input: &str) -> f64 {
        pricing::estimate_cost(input, self.cost_per_unit)
    }

    fn invoke(&self, _input: &str) -> Result<String, PcAgentError> {
        let ok = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_bool(success_rate(self.tier));
        if ok {
            Ok(format!("{} completed the subtask", self.name))
        } else {
            Err(PcAgentError::backend(self.tier, "simulated failure"))
        }
    }
}

/// Factory sharing one seeded RNG across all simulated tiers.
struct SimulatedBackendFactory {
    rng: Arc<Mutex<StdRng>>,
}

impl SimulatedBackendFactory {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

impl BackendFactory for SimulatedBackendFactory {
    fn create(&self, tier: ModelTier, model: &ModelConfig) -> Arc<dyn BackendHandle> {
        match tier {
            ModelTier::Rule => Arc::new(RuleBackend::new(model.name.clone())),
            _ => Arc::new(SimulatedBackend {
                tier,
                name: model.name.clone(),
                cost_per_unit: model.cost_per_unit,
                rng: Arc::clone(&self.rng),
            }),
        }
    }
}

/// Outcome of one simulated subtask.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedRun {
    pub description: String,
    pub complexity: f64,
    pub selected: ModelTier,
    pub executed_on: ModelTier,
    pub attempts: Vec<ModelTier>,
    pub success: bool,
    pub output: String,
}

/// Headline metrics of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub total_tasks: usize,
    pub total_success: usize,
    /// Fraction of subtasks that finished on some tier.
    pub success_rate: f64,
    /// Success fraction of backend calls per tier, over tiers that were called.
    pub tier_success_rates: BTreeMap<ModelTier, f64>,
    pub total_cost: f64,
    pub avg_cost_per_task: f64,
    /// Cost of sending every subtask once to the premium tier.
    pub baseline_cost: f64,
    /// `(baseline - total) / baseline`, 0 when the baseline is free.
    pub cost_savings_vs_baseline: f64,
    /// Successful subtasks per unit of spend, 0 when nothing was spent.
    pub cost_effectiveness: f64,
}

/// Full simulation report.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub mode: Option<SimulationMode>,
    pub runs: Vec<SimulatedRun>,
    pub summary: SimulationSummary,
    pub stats: RoutingStats,
    pub budget: BudgetStatus,
}

/// Non-empty, non-comment lines of a task file.
pub fn parse_tasks(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Simulate executing `tasks` in order, optionally under a threshold preset.
pub fn simulate(
    config: &PcAgentConfig,
    tasks: &[String],
    seed: Option<u64>,
    mode: Option<SimulationMode>,
) -> SimulationReport {
    let config = match mode {
        Some(mode) => mode.apply(config),
        None => config.clone(),
    };
    let factory = SimulatedBackendFactory::new(seed);
    let agent = RouterAgent::with_components(&config, Arc::new(SystemClock), &factory);

    let runs = tasks
        .iter()
        .map(|description| {
            let selected = agent.select_model(description, None);
            let outcome = execute_with_fallback(&agent, description, &selected);
            debug!(
                selected = %selected.tier,
                executed_on = %outcome.tier,
                attempts = outcome.attempted.len(),
                "simulated subtask"
            );
            let success = outcome.succeeded();
            let output = match outcome.result {
                Ok(text) => text,
                Err(e) => e.to_string(),
            };
            SimulatedRun {
                description: description.clone(),
                complexity: selected.complexity,
                selected: selected.tier,
                executed_on: outcome.tier,
                attempts: outcome.attempted,
                success,
                output,
            }
        })
        .collect::<Vec<SimulatedRun>>();

    let stats = agent.get_routing_stats();
    let tier_success_rates = ModelTier::iter()
        .filter_map(|tier| {
            agent
                .tier_performance(tier)
                .success_rate()
                .map(|rate| (tier, rate))
        })
        .collect();
    let baseline_per_task = agent.selector().get_model_cost(ModelTier::Premium);
    let summary = summarize(&runs, stats.budget_used, baseline_per_task, tier_success_rates);

    info!(
        subtasks = tasks.len(),
        success_rate = summary.success_rate,
        spent = summary.total_cost,
        savings = summary.cost_savings_vs_baseline,
        "simulation finished"
    );
    SimulationReport {
        mode,
        runs,
        summary,
        stats,
        budget: agent.budget_status(),
    }
}

fn summarize(
    runs: &[SimulatedRun],
    total_cost: f64,
    baseline_per_task: f64,
    tier_success_rates: BTreeMap<ModelTier, f64>,
) -> SimulationSummary {
    let total_tasks = runs.len();
    let total_success = runs.iter().filter(|run| run.success).count();
    let per_task = |value: f64| {
        if total_tasks == 0 {
            0.0
        } else {
            value / total_tasks as f64
        }
    };
    let baseline_cost = baseline_per_task * total_tasks as f64;
    let cost_savings_vs_baseline = if baseline_cost > 0.0 {
        (baseline_cost - total_cost) / baseline_cost
    } else {
        0.0
    };
    let cost_effectiveness = if total_cost > 0.0 {
        total_success as f64 / total_cost
    } else {
        0.0
    };

    SimulationSummary {
        total_tasks,
        total_success,
        success_rate: per_task(total_success as f64),
        tier_success_rates,
        total_cost,
        avg_cost_per_task: per_task(total_cost),
        baseline_cost,
        cost_savings_vs_baseline,
        cost_effectiveness,
    }
}

/// Run the `pcagent simulate` command.
pub fn run_simulate(
    config: &PcAgentConfig,
    file: &Path,
    seed: Option<u64>,
    mode: Option<SimulationMode>,
    json: bool,
) -> Result<(), PcAgentError> {
    let text = std::fs::read_to_string(file).map_err(|e| {
        PcAgentError::InvalidInput(format!("failed to read {}: {e}", file.display()))
    })?;
    let tasks = parse_tasks(&text);
    if tasks.is_empty() {
        return Err(PcAgentError::InvalidInput(format!(
            "no subtasks found in {}",
            file.display()
        )));
    }

    let report = simulate(config, &tasks, seed, mode);
    if json {
        return crate::print_json(&report);
    }

    for run in &report.runs {
        let marker = if run.success { "ok  " } else { "FAIL" };
        let path = run
            .attempts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        println!(
            "{marker} {:.3} [{path}] {}",
            run.complexity, run.description
        );
    }

    let summary = &report.summary;
    let stats = &report.stats;
    println!();
    if let Some(mode) = report.mode {
        println!("mode:           {mode:?}");
    }
    println!(
        "success rate:   {:.1}% ({} of {})",
        summary.success_rate * 100.0,
        summary.total_success,
        summary.total_tasks
    );
    println!("avg complexity: {:.3}", stats.avg_complexity);
    println!("tier usage:");
    for (tier, share) in &stats.model_distribution {
        let success = summary
            .tier_success_rates
            .get(tier)
            .map(|rate| format!("{:.1}% calls succeeded", rate * 100.0))
            .unwrap_or_else(|| "not called".to_string());
        println!("  {:<8} {:>5.1}%  {success}", tier.to_string(), share * 100.0);
    }
    println!("spent:          {:.6}", summary.total_cost);
    println!("avg cost/task:  {:.6}", summary.avg_cost_per_task);
    println!(
        "vs all-premium: {:.1}% saved (baseline {:.6})",
        summary.cost_savings_vs_baseline * 100.0,
        summary.baseline_cost
    );
    if summary.cost_effectiveness > 0.0 {
        println!("successes/unit: {:.1}", summary.cost_effectiveness);
    }
    println!("remaining:      {:.6}", report.budget.remaining);
    if report.budget.is_critical {
        println!("budget status:  critical");
    } else if report.budget.is_warning {
        println!("budget status:  warning");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASKS: &str = "\
# morning routine
open chrome

Copy the data from Excel to Word, then format the table and calculate the sum if needed.
click the save button
Summarize the quarterly report from Outlook to Word based on the chart.
";

    #[test]
    fn parse_skips_comments_and_blanks() {
        let tasks = parse_tasks(TASKS);
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0], "open chrome");
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let config = PcAgentConfig::default();
        let tasks = parse_tasks(TASKS);
        let a = simulate(&config, &tasks, Some(42), None);
        let b = simulate(&config, &tasks, Some(42), None);

        let summary = |r: &SimulationReport| {
            r.runs
                .iter()
                .map(|run| (run.attempts.clone(), run.success))
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&a), summary(&b));
        assert_eq!(a.stats.budget_used, b.stats.budget_used);
    }

    #[test]
    fn rule_tasks_run_for_free() {
        let config = PcAgentConfig::default();
        let report = simulate(&config, &["open chrome".to_string()], Some(1), None);
        let run = &report.runs[0];
        assert_eq!(run.selected, ModelTier::Rule);
        assert!(run.success);
        assert_eq!(run.output, "application_opened");
        assert_eq!(report.stats.budget_used, 0.0);
    }

    #[test]
    fn every_decision_is_counted() {
        let config = PcAgentConfig::default();
        let tasks = parse_tasks(TASKS);
        let report = simulate(&config, &tasks, Some(7), None);
        assert_eq!(report.stats.total_decisions, tasks.len() as u64);
        assert_eq!(report.runs.len(), tasks.len());
    }

    #[test]
    fn summary_reports_rates_and_savings() {
        let config = PcAgentConfig::default();
        let tasks = parse_tasks(TASKS);
        let report = simulate(&config, &tasks, Some(11), None);
        let summary = &report.summary;

        assert_eq!(summary.total_tasks, 4);
        let successes = report.runs.iter().filter(|r| r.success).count();
        assert_eq!(summary.total_success, successes);
        assert!((summary.success_rate - successes as f64 / 4.0).abs() < 1e-12);
        assert!((summary.baseline_cost - 4.0 * 0.015).abs() < 1e-12);
        assert!((summary.total_cost - report.stats.budget_used).abs() < 1e-12);
        assert!((summary.avg_cost_per_task - summary.total_cost / 4.0).abs() < 1e-12);
        // Two of the four subtasks run on the free rule tier.
        assert!(summary.cost_savings_vs_baseline > 0.0);
        assert!(summary.tier_success_rates.contains_key(&ModelTier::Rule));
        assert!(
            summary
                .tier_success_rates
                .values()
                .all(|rate| (0.0..=1.0).contains(rate))
        );
    }

    #[test]
    fn summary_of_free_run_has_no_savings_ratio_blowup() {
        let runs = vec![SimulatedRun {
            description: "open chrome".to_string(),
            complexity: 0.02,
            selected: ModelTier::Rule,
            executed_on: ModelTier::Rule,
            attempts: vec![ModelTier::Rule],
            success: true,
            output: "application_opened".to_string(),
        }];
        let summary = summarize(&runs, 0.0, 0.0, BTreeMap::new());
        assert_eq!(summary.success_rate, 1.0);
        assert_eq!(summary.cost_savings_vs_baseline, 0.0);
        assert_eq!(summary.cost_effectiveness, 0.0);

        let summary = summarize(&runs, 0.0, 0.015, BTreeMap::new());
        assert_eq!(summary.cost_savings_vs_baseline, 1.0);
    }

    #[test]
    fn modes_shift_tier_choice() {
        let config = PcAgentConfig::default();
        let tier = |task: &str, mode| {
            simulate(&config, &[task.to_string()], Some(5), Some(mode)).runs[0].selected
        };

        // Scores about 0.89.
        let complex =
            "Copy the data from Excel to Word, then format the table and calculate the sum if needed.";
        assert_eq!(tier(complex, SimulationMode::Balanced), ModelTier::Premium);
        assert_eq!(tier(complex, SimulationMode::CostSaving), ModelTier::Mid);

        // Scores about 0.73.
        let report = "Summarize the quarterly report from Outlook to Word based on the chart.";
        assert_eq!(tier(report, SimulationMode::Balanced), ModelTier::Mid);
        assert_eq!(tier(report, SimulationMode::Performance), ModelTier::Premium);
    }

    #[test]
    fn missing_file_is_invalid_input() {
        let err = run_simulate(
            &PcAgentConfig::default(),
            Path::new("/nonexistent/pcagent-tasks.txt"),
            None,
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PcAgentError::InvalidInput(_)));
    }
}
