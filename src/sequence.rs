//! Per-participant cluster-visit sequence construction.
//!
//! Converts one clustering run's labeled points into an ordered,
//! duplicate-collapsed sequence of cluster visits per participant. Noise
//! points are dropped, and only *immediately adjacent* repeats collapse:
//! a participant who dwells in cluster 3, leaves, and returns later keeps
//! two separate entries of 3.

use std::collections::HashMap;

use crate::LabeledPoint;

/// How to order a participant's points before walking them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceOrder {
    /// Stable sort by recording timestamp. Points without a timestamp sort
    /// first; ties keep their ingestion order.
    #[default]
    Timestamp,
    /// Keep the original ingestion order unchanged.
    Ingestion,
}

/// Build one cluster-visit sequence per participant.
///
/// Every participant present in the input gets an entry, even if all of
/// their points were noise (an empty sequence, not an error).
pub fn build_sequences(
    labeled: &[LabeledPoint],
    order: SequenceOrder,
) -> HashMap<String, Vec<u32>> {
    // Group point indices per participant, preserving ingestion order.
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, lp) in labeled.iter().enumerate() {
        groups.entry(lp.point.participant.as_str()).or_default().push(i);
    }

    groups
        .into_iter()
        .map(|(participant, mut indices)| {
            if order == SequenceOrder::Timestamp {
                indices.sort_by_key(|&i| labeled[i].point.timestamp);
            }

            let mut sequence: Vec<u32> = Vec::new();
            for i in indices {
                let Some(label) = labeled[i].cluster else {
                    continue; // noise never enters a sequence
                };
                if sequence.last() != Some(&label) {
                    sequence.push(label);
                }
            }
            (participant.to_string(), sequence)
        })
        .collect()
}
