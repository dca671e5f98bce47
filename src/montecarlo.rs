//! Monte Carlo permutation testing of rule significance.
//!
//! Tests whether each observed rule's support could plausibly arise from
//! random ordering of cluster visits. The null model keeps every
//! participant's sequence *length* fixed and draws the cluster at each
//! position i.i.d. from the empirical marginal distribution of cluster
//! visits. Each trial mines the synthetic corpus and compares its support
//! against the observed support, rule by rule.
//!
//! Trials are independent, so with the `parallel` feature they fan out
//! across rayon workers and their counters merge by summation.

use log::info;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

use crate::error::{AnalysisError, Result};
use crate::mining::{MiningResult, mine_corpus};
use crate::progress::{CancelToken, MonteCarloProgress};
use crate::{Rule, RuleStatistics};

/// Configuration for the Monte Carlo test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloConfig {
    /// Number of synthetic trials to run. Must be at least 1.
    pub num_trials: u32,
    /// Base RNG seed. Trial `t` seeds its own generator from
    /// `seed + t`, so results are reproducible and independent of
    /// thread scheduling.
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_trials: 1000,
            seed: 42,
        }
    }
}

/// Outcome of a Monte Carlo run, possibly truncated by cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloResult {
    /// Empirical p-value per observed rule: the fraction of completed
    /// trials whose synthetic support met or exceeded the observed
    /// support. A rule never met in any trial reports exactly 0.0.
    /// Empty if zero trials completed.
    pub p_values: HashMap<Rule, f64>,
    /// Trial count originally requested.
    pub trials_requested: u32,
    /// Trial count the p-values are actually computed from. Equals
    /// `trials_requested` unless the run was cancelled.
    pub trials_completed: u32,
    /// True if the run was stopped early through the cancel token.
    pub cancelled: bool,
}

/// The null model shared by every trial.
///
/// Built once from the real corpus; fields are ordered deterministically
/// (participants and labels sorted) so a fixed seed reproduces bit-equal
/// results regardless of hash-map iteration order.
struct NullModel {
    /// Real sequence length per participant, sorted by participant id.
    lengths: Vec<usize>,
    /// Cluster labels in ascending order.
    labels: Vec<u32>,
    /// Empirical visit distribution over `labels`.
    distribution: WeightedIndex<u32>,
    /// Observed rules with their support, the bar each trial must meet.
    observed: Vec<(Rule, f64)>,
}

impl NullModel {
    fn build(
        sequences: &HashMap<String, Vec<u32>>,
        mining: &MiningResult,
        statistics: &HashMap<Rule, RuleStatistics>,
    ) -> Option<Self> {
        let mut participants: Vec<&String> = sequences.keys().collect();
        participants.sort();
        let lengths: Vec<usize> = participants.iter().map(|p| sequences[*p].len()).collect();

        let mut labels: Vec<u32> = mining.cluster_participant_count.keys().copied().collect();
        labels.sort_unstable();
        let weights: Vec<u32> = labels
            .iter()
            .map(|l| mining.cluster_participant_count[l])
            .collect();
        let distribution = WeightedIndex::new(weights.iter().copied()).ok()?;

        let mut observed: Vec<(Rule, f64)> = statistics
            .iter()
            .map(|(&rule, stats)| (rule, stats.support))
            .collect();
        observed.sort_by_key(|&(rule, _)| rule);

        Some(Self {
            lengths,
            labels,
            distribution,
            observed,
        })
    }

    /// Run one trial and return the observed rules whose synthetic support
    /// met or exceeded their real support. Rules that appear only in the
    /// synthetic corpus are discarded with the trial.
    fn run_trial(&self, trial_seed: u64) -> Vec<Rule> {
        let mut rng = StdRng::seed_from_u64(trial_seed);

        let synthetic: Vec<Vec<u32>> = self
            .lengths
            .iter()
            .map(|&len| {
                (0..len)
                    .map(|_| self.labels[self.distribution.sample(&mut rng)])
                    .collect()
            })
            .collect();

        let trial_mining = mine_corpus(synthetic.iter().map(|s| s.as_slice()));
        let trial_total = trial_mining.total_distinct_rules() as f64;

        self.observed
            .iter()
            .filter(|(rule, real_support)| {
                let trial_count = trial_mining.rule_count.get(rule).copied().unwrap_or(0);
                if trial_count == 0 {
                    return false;
                }
                trial_count as f64 / trial_total >= *real_support
            })
            .map(|&(rule, _)| rule)
            .collect()
    }
}

fn validate(config: &MonteCarloConfig) -> Result<()> {
    if config.num_trials < 1 {
        return Err(AnalysisError::invalid_parameter(
            "num_trials",
            config.num_trials,
            "must be >= 1",
        ));
    }
    Ok(())
}

fn assemble_result(
    observed: &[(Rule, f64)],
    hits: HashMap<Rule, u32>,
    requested: u32,
    completed: u32,
    cancelled: bool,
) -> MonteCarloResult {
    let p_values = if completed == 0 {
        HashMap::new()
    } else {
        observed
            .iter()
            .map(|&(rule, _)| {
                let met = hits.get(&rule).copied().unwrap_or(0);
                (rule, met as f64 / completed as f64)
            })
            .collect()
    };

    MonteCarloResult {
        p_values,
        trials_requested: requested,
        trials_completed: completed,
        cancelled,
    }
}

/// Estimate an empirical p-value for every observed rule, serially.
///
/// Cancellation is checked before each trial; a cancelled run returns the
/// p-values computed from however many trials completed, with
/// [`MonteCarloResult::trials_completed`] reporting that count. An empty
/// rule set short-circuits to an empty result without running any trials.
///
/// # Errors
/// [`AnalysisError::InvalidParameter`] if `num_trials < 1`.
pub fn estimate_p_values(
    sequences: &HashMap<String, Vec<u32>>,
    mining: &MiningResult,
    statistics: &HashMap<Rule, RuleStatistics>,
    config: &MonteCarloConfig,
    progress: &dyn MonteCarloProgress,
    cancel: &CancelToken,
) -> Result<MonteCarloResult> {
    validate(config)?;

    let Some(model) = NullModel::build(sequences, mining, statistics) else {
        return Ok(assemble_result(&[], HashMap::new(), config.num_trials, 0, false));
    };
    if model.observed.is_empty() {
        return Ok(assemble_result(&[], HashMap::new(), config.num_trials, 0, false));
    }

    info!(
        "monte carlo: {} trials over {} rules ({} participants)",
        config.num_trials,
        model.observed.len(),
        model.lengths.len()
    );
    progress.on_start(config.num_trials);

    let mut hits: HashMap<Rule, u32> = HashMap::new();
    let mut completed: u32 = 0;

    for trial in 0..config.num_trials {
        if cancel.is_cancelled() {
            info!("monte carlo cancelled after {completed} trials");
            break;
        }
        for rule in model.run_trial(config.seed.wrapping_add(trial as u64)) {
            *hits.entry(rule).or_insert(0) += 1;
        }
        completed += 1;
        progress.on_trial(completed);
    }

    Ok(assemble_result(
        &model.observed,
        hits,
        config.num_trials,
        completed,
        completed < config.num_trials,
    ))
}

/// Estimate p-values with trials spread across rayon worker threads.
///
/// Per-trial seeding makes the p-values identical to the serial path for
/// the same config; only the completion count under cancellation depends
/// on scheduling (in-flight trials finish and are counted). Partial
/// per-trial counters merge by summation, which is commutative and
/// associative, so any subset of completed trials combines correctly.
#[cfg(feature = "parallel")]
pub fn estimate_p_values_parallel(
    sequences: &HashMap<String, Vec<u32>>,
    mining: &MiningResult,
    statistics: &HashMap<Rule, RuleStatistics>,
    config: &MonteCarloConfig,
    progress: &dyn MonteCarloProgress,
    cancel: &CancelToken,
) -> Result<MonteCarloResult> {
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    validate(config)?;

    let Some(model) = NullModel::build(sequences, mining, statistics) else {
        return Ok(assemble_result(&[], HashMap::new(), config.num_trials, 0, false));
    };
    if model.observed.is_empty() {
        return Ok(assemble_result(&[], HashMap::new(), config.num_trials, 0, false));
    }

    info!(
        "monte carlo (parallel): {} trials over {} rules ({} participants)",
        config.num_trials,
        model.observed.len(),
        model.lengths.len()
    );
    progress.on_start(config.num_trials);

    let completed = AtomicU32::new(0);

    let per_trial_hits: Vec<Vec<Rule>> = (0..config.num_trials)
        .into_par_iter()
        .filter_map(|trial| {
            if cancel.is_cancelled() {
                return None;
            }
            let met = model.run_trial(config.seed.wrapping_add(trial as u64));
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            progress.on_trial(done);
            Some(met)
        })
        .collect();

    let mut hits: HashMap<Rule, u32> = HashMap::new();
    for met in per_trial_hits {
        for rule in met {
            *hits.entry(rule).or_insert(0) += 1;
        }
    }

    let completed = completed.load(Ordering::SeqCst);
    if completed < config.num_trials {
        info!("monte carlo cancelled after {completed} trials");
    }

    Ok(assemble_result(
        &model.observed,
        hits,
        config.num_trials,
        completed,
        completed < config.num_trials,
    ))
}
