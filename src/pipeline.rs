//! End-to-end analysis pipeline.
//!
//! One call drives cluster -> centroids -> sequences -> rule mining ->
//! metrics -> Monte Carlo and returns a complete, immutable snapshot.
//! Every stage takes the previous stage's output as an explicit argument;
//! there is no shared mutable state, so a rerun with new parameters simply
//! replaces the old [`AnalysisResult`] wholesale.
//!
//! At most one analysis should be in flight per consumer: cancel the
//! previous run's [`CancelToken`] before starting a new one, otherwise two
//! runs race to report results to the same display.

use log::info;
use std::collections::HashMap;

use crate::centroid::centroids;
use crate::cluster::cluster;
use crate::error::{AnalysisError, Result};
use crate::mining::{compute_statistics, mine};
use crate::montecarlo::{MonteCarloConfig, MonteCarloResult};
use crate::progress::{CancelToken, MonteCarloProgress};
use crate::sequence::{SequenceOrder, build_sequences};
use crate::{LabeledPoint, Point, Rule, RuleStatistics};

/// Parameters for one full analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    /// DBSCAN neighborhood radius, in the same units as the point coordinates.
    pub eps: f64,
    /// Minimum neighborhood size (including the point itself) for a core point.
    pub min_samples: usize,
    /// Monte Carlo trial count and seed.
    pub monte_carlo: MonteCarloConfig,
    /// Ordering used when walking each participant's points.
    pub order: SequenceOrder,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            eps: 20.0,
            min_samples: 15,
            monte_carlo: MonteCarloConfig::default(),
            order: SequenceOrder::Timestamp,
        }
    }
}

impl AnalysisParams {
    /// Check parameter ranges without running anything.
    pub fn validate(&self) -> Result<()> {
        if !(self.eps > 0.0) {
            return Err(AnalysisError::invalid_parameter(
                "eps",
                self.eps,
                "must be > 0",
            ));
        }
        if self.min_samples < 1 {
            return Err(AnalysisError::invalid_parameter(
                "min_samples",
                self.min_samples,
                "must be >= 1",
            ));
        }
        if self.monte_carlo.num_trials < 1 {
            return Err(AnalysisError::invalid_parameter(
                "num_trials",
                self.monte_carlo.num_trials,
                "must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Display thresholds for filtering which rules are surfaced to a renderer.
///
/// Each field is a fraction in `[0, 1]`. Filtering never alters the
/// underlying statistics, only which rows are returned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RuleFilter {
    pub support: f64,
    pub forward_confidence: f64,
    pub backward_confidence: f64,
}

/// Complete output of one analysis run.
///
/// All fields are derived from a single clustering run and are internally
/// consistent; stale results from a previous run should be discarded and
/// replaced with a new instance atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Every usable input point with its cluster assignment.
    pub labeled: Vec<LabeledPoint>,
    /// Centroid per non-noise cluster. Empty when everything was noise.
    pub centroids: HashMap<u32, (f64, f64)>,
    /// Collapsed cluster-visit sequence per participant.
    pub sequences: HashMap<String, Vec<u32>>,
    /// Per-rule statistics, with `p_value` filled from the Monte Carlo run.
    pub statistics: HashMap<Rule, RuleStatistics>,
    /// Trial count requested for the Monte Carlo test.
    pub trials_requested: u32,
    /// Trial count the p-values were actually computed from.
    pub trials_completed: u32,
    /// True if the Monte Carlo phase was cancelled early.
    pub cancelled: bool,
}

impl AnalysisResult {
    /// Rules passing every threshold of `filter`, sorted by rule id for
    /// stable display.
    pub fn filtered_rules(&self, filter: &RuleFilter) -> Vec<(Rule, &RuleStatistics)> {
        let mut rules: Vec<(Rule, &RuleStatistics)> = self
            .statistics
            .iter()
            .filter(|(_, s)| {
                s.support >= filter.support
                    && s.forward_confidence >= filter.forward_confidence
                    && s.backward_confidence >= filter.backward_confidence
            })
            .map(|(&rule, s)| (rule, s))
            .collect();
        rules.sort_by_key(|&(rule, _)| rule);
        rules
    }

    /// All rules sorted by ascending p-value, most significant first.
    /// Rules without a p-value sort last.
    pub fn rules_by_significance(&self) -> Vec<(Rule, &RuleStatistics)> {
        let mut rules: Vec<(Rule, &RuleStatistics)> = self
            .statistics
            .iter()
            .map(|(&rule, s)| (rule, s))
            .collect();
        rules.sort_by(|(rule_a, a), (rule_b, b)| {
            let pa = a.p_value.unwrap_or(f64::INFINITY);
            let pb = b.p_value.unwrap_or(f64::INFINITY);
            pa.total_cmp(&pb).then(rule_a.cmp(rule_b))
        });
        rules
    }

    /// The lone participant's visit sequence, when the run covered exactly
    /// one participant. Renderers draw this path directly instead of
    /// significance arrows, since rules over a single sequence carry no
    /// between-participant information.
    pub fn single_participant_path(&self) -> Option<(&str, &[u32])> {
        if self.sequences.len() != 1 {
            return None;
        }
        self.sequences
            .iter()
            .next()
            .map(|(participant, seq)| (participant.as_str(), seq.as_slice()))
    }
}

/// Run the full pipeline over a point dataset.
///
/// `progress` and `cancel` apply to the Monte Carlo phase, the only
/// long-running stage. Cancellation truncates the trial count and is
/// reported through [`AnalysisResult::cancelled`], never as an error.
///
/// # Errors
/// - [`AnalysisError::InvalidParameter`] for out-of-range parameters.
/// - [`AnalysisError::EmptyInput`] when no usable points remain after
///   dropping rows with non-finite coordinates.
pub fn run_analysis(
    points: &[Point],
    params: &AnalysisParams,
    progress: &dyn MonteCarloProgress,
    cancel: &CancelToken,
) -> Result<AnalysisResult> {
    params.validate()?;

    let labeled = cluster(points, params.eps, params.min_samples)?;
    if labeled.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let num_clustered = labeled.iter().filter(|lp| !lp.is_noise()).count();
    info!(
        "clustered {} points: {} in clusters, {} noise",
        labeled.len(),
        num_clustered,
        labeled.len() - num_clustered
    );

    // All noise: a legitimate outcome for a too-tight eps, not an error.
    // Sequences are all empty and there is nothing to mine or test.
    if num_clustered == 0 {
        let sequences = build_sequences(&labeled, params.order);
        return Ok(AnalysisResult {
            labeled,
            centroids: HashMap::new(),
            sequences,
            statistics: HashMap::new(),
            trials_requested: params.monte_carlo.num_trials,
            trials_completed: 0,
            cancelled: false,
        });
    }

    let cluster_centroids = centroids(&labeled)?;
    let sequences = build_sequences(&labeled, params.order);
    let mining = mine(&sequences);
    let mut statistics = compute_statistics(&mining);
    info!(
        "mined {} rules across {} participants",
        statistics.len(),
        sequences.len()
    );

    let mc = run_monte_carlo(
        &sequences,
        &mining,
        &statistics,
        &params.monte_carlo,
        progress,
        cancel,
    )?;
    for (rule, p_value) in &mc.p_values {
        if let Some(stats) = statistics.get_mut(rule) {
            stats.p_value = Some(*p_value);
        }
    }

    Ok(AnalysisResult {
        labeled,
        centroids: cluster_centroids,
        sequences,
        statistics,
        trials_requested: mc.trials_requested,
        trials_completed: mc.trials_completed,
        cancelled: mc.cancelled,
    })
}

#[cfg(feature = "parallel")]
fn run_monte_carlo(
    sequences: &HashMap<String, Vec<u32>>,
    mining: &crate::mining::MiningResult,
    statistics: &HashMap<Rule, RuleStatistics>,
    config: &MonteCarloConfig,
    progress: &dyn MonteCarloProgress,
    cancel: &CancelToken,
) -> Result<MonteCarloResult> {
    crate::montecarlo::estimate_p_values_parallel(
        sequences, mining, statistics, config, progress, cancel,
    )
}

#[cfg(not(feature = "parallel"))]
fn run_monte_carlo(
    sequences: &HashMap<String, Vec<u32>>,
    mining: &crate::mining::MiningResult,
    statistics: &HashMap<Rule, RuleStatistics>,
    config: &MonteCarloConfig,
    progress: &dyn MonteCarloProgress,
    cancel: &CancelToken,
) -> Result<MonteCarloResult> {
    crate::montecarlo::estimate_p_values(sequences, mining, statistics, config, progress, cancel)
}
