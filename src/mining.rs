//! Ordinal association-rule mining and scoring.
//!
//! A rule `(A, B)` means "cluster A is visited before cluster B" somewhere
//! in a participant's sequence, not necessarily adjacently. Rules are
//! directional: `(A, B)` and `(B, A)` are distinct.

use std::collections::{BTreeSet, HashMap};

use crate::{Rule, RuleStatistics};

/// Raw counts produced by one mining pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiningResult {
    /// For each rule, the number of participants whose sequence exhibits it.
    pub rule_count: HashMap<Rule, u32>,
    /// For each cluster, the number of participants who visit it at least once.
    pub cluster_participant_count: HashMap<u32, u32>,
}

impl MiningResult {
    /// Number of distinct rules observed across all participants.
    pub fn total_distinct_rules(&self) -> usize {
        self.rule_count.len()
    }
}

/// Mine ordinal association rules from per-participant sequences.
///
/// For each sequence, every ordered index pair `(i, j)` with `i < j` yields
/// the rule `(seq[i], seq[j])`. Pairs with equal labels are skipped (a
/// non-adjacent revisit of the same cluster is not a rule), and each rule
/// counts at most once per participant regardless of how many index pairs
/// produce it. Empty input yields an empty, valid result.
pub fn mine(sequences: &HashMap<String, Vec<u32>>) -> MiningResult {
    mine_corpus(sequences.values().map(|s| s.as_slice()))
}

/// Mining over any corpus of sequences; shared with the Monte Carlo trials,
/// which work on unnamed synthetic sequences.
pub(crate) fn mine_corpus<'a>(sequences: impl Iterator<Item = &'a [u32]>) -> MiningResult {
    let mut rule_count: HashMap<Rule, u32> = HashMap::new();
    let mut cluster_participant_count: HashMap<u32, u32> = HashMap::new();

    for sequence in sequences {
        // BTreeSets keep per-participant de-duplication deterministic.
        let mut rules_for_participant: BTreeSet<Rule> = BTreeSet::new();
        for i in 0..sequence.len() {
            for j in (i + 1)..sequence.len() {
                if sequence[i] == sequence[j] {
                    continue;
                }
                rules_for_participant.insert((sequence[i], sequence[j]));
            }
        }
        for rule in rules_for_participant {
            *rule_count.entry(rule).or_insert(0) += 1;
        }

        let visited: BTreeSet<u32> = sequence.iter().copied().collect();
        for cluster in visited {
            *cluster_participant_count.entry(cluster).or_insert(0) += 1;
        }
    }

    MiningResult {
        rule_count,
        cluster_participant_count,
    }
}

/// Convert raw mining counts into per-rule statistics.
///
/// Support divides by the number of *distinct* rules observed, so supports
/// sum to 1.0 over the whole rule set; forward and backward confidence
/// divide by the participant count of the rule's first and second cluster.
/// Both denominators are at least 1 whenever the rule exists, so no
/// division by zero can occur. `p_value` is left unset here and filled in
/// by the Monte Carlo tester.
pub fn compute_statistics(mining: &MiningResult) -> HashMap<Rule, RuleStatistics> {
    let total_rules = mining.total_distinct_rules() as f64;

    mining
        .rule_count
        .iter()
        .map(|(&rule, &count)| {
            let (from, to) = rule;
            let stats = RuleStatistics {
                count,
                support: count as f64 / total_rules,
                forward_confidence: count as f64 / mining.cluster_participant_count[&from] as f64,
                backward_confidence: count as f64 / mining.cluster_participant_count[&to] as f64,
                p_value: None,
            };
            (rule, stats)
        })
        .collect()
}
