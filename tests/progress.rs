//! Tests for the progress module

use std::collections::HashMap;

use scanmine::{
    AtomicProgressTracker, CancelToken, MonteCarloConfig, MonteCarloProgress, compute_statistics,
    estimate_p_values, mine,
};

fn corpus(sequences: &[(&str, &[u32])]) -> HashMap<String, Vec<u32>> {
    sequences
        .iter()
        .map(|(participant, seq)| (participant.to_string(), seq.to_vec()))
        .collect()
}

#[test]
fn test_tracker_reaches_completion_over_a_real_run() {
    let sequences = corpus(&[("p01", &[1, 2, 3]), ("p02", &[2, 1]), ("p03", &[3, 2])]);
    let mining = mine(&sequences);
    let stats = compute_statistics(&mining);

    let tracker = AtomicProgressTracker::new();
    assert_eq!(tracker.fraction(), 0.0);
    assert!(tracker.estimated_remaining().is_none());

    let config = MonteCarloConfig {
        num_trials: 50,
        seed: 5,
    };
    estimate_p_values(
        &sequences,
        &mining,
        &stats,
        &config,
        &tracker,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(tracker.fraction(), 1.0);
    assert_eq!(tracker.completed.load(std::sync::atomic::Ordering::SeqCst), 50);
    assert_eq!(tracker.total.load(std::sync::atomic::Ordering::SeqCst), 50);
}

#[test]
fn test_remaining_estimate_appears_after_first_trial() {
    let tracker = AtomicProgressTracker::new();
    assert!(tracker.estimated_remaining().is_none());

    tracker.on_start(10);
    assert!(tracker.estimated_remaining().is_none());

    tracker.on_trial(1);
    assert!(tracker.estimated_remaining().is_some());

    tracker.on_trial(10);
    assert_eq!(
        tracker.estimated_remaining(),
        Some(std::time::Duration::ZERO)
    );
}

#[test]
fn test_tracker_is_monotone_under_out_of_order_reports() {
    // Parallel workers finish in arbitrary order, so a report of 3 can
    // arrive after a report of 5. The tracker must never move backwards.
    let tracker = AtomicProgressTracker::new();
    tracker.on_start(10);

    tracker.on_trial(5);
    assert_eq!(tracker.fraction(), 0.5);

    tracker.on_trial(3);
    assert_eq!(tracker.fraction(), 0.5);

    tracker.on_trial(7);
    assert_eq!(tracker.fraction(), 0.7);
}

#[test]
fn test_restart_resets_counts() {
    let tracker = AtomicProgressTracker::new();
    tracker.on_start(10);
    tracker.on_trial(10);
    assert_eq!(tracker.fraction(), 1.0);

    tracker.on_start(20);
    assert_eq!(tracker.fraction(), 0.0);
}
