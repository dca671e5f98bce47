//! Tests for the sequence module

use scanmine::{LabeledPoint, Point, SequenceOrder, build_sequences};

fn visit(participant: &str, timestamp: i64, cluster: Option<u32>) -> LabeledPoint {
    LabeledPoint {
        point: Point::with_timestamp(0.0, 0.0, participant, timestamp),
        cluster,
    }
}

#[test]
fn test_adjacent_duplicates_collapse() {
    // [A, A, B, B, A] -> [A, B, A]: only immediately adjacent repeats collapse.
    let labeled = vec![
        visit("p01", 0, Some(1)),
        visit("p01", 1, Some(1)),
        visit("p01", 2, Some(2)),
        visit("p01", 3, Some(2)),
        visit("p01", 4, Some(1)),
    ];

    let sequences = build_sequences(&labeled, SequenceOrder::Timestamp);
    assert_eq!(sequences["p01"], vec![1, 2, 1]);
}

#[test]
fn test_noise_removed_and_collapses_across_gap() {
    // Noise between two visits of the same cluster leaves them adjacent,
    // so they collapse; noise between different clusters changes nothing.
    let labeled = vec![
        visit("p01", 0, Some(1)),
        visit("p01", 1, None),
        visit("p01", 2, Some(1)),
        visit("p01", 3, None),
        visit("p01", 4, Some(2)),
    ];

    let sequences = build_sequences(&labeled, SequenceOrder::Timestamp);
    assert_eq!(sequences["p01"], vec![1, 2]);
}

#[test]
fn test_all_noise_participant_yields_empty_sequence() {
    let labeled = vec![
        visit("p01", 0, None),
        visit("p01", 1, None),
        visit("p02", 0, Some(3)),
    ];

    let sequences = build_sequences(&labeled, SequenceOrder::Timestamp);
    assert_eq!(sequences["p01"], Vec::<u32>::new());
    assert_eq!(sequences["p02"], vec![3]);
}

#[test]
fn test_participants_independent() {
    let labeled = vec![
        visit("p01", 0, Some(1)),
        visit("p02", 0, Some(2)),
        visit("p01", 1, Some(2)),
        visit("p02", 1, Some(1)),
    ];

    let sequences = build_sequences(&labeled, SequenceOrder::Timestamp);
    assert_eq!(sequences["p01"], vec![1, 2]);
    assert_eq!(sequences["p02"], vec![2, 1]);
}

#[test]
fn test_timestamp_order_sorts_out_of_order_points() {
    let labeled = vec![
        visit("p01", 10, Some(2)),
        visit("p01", 0, Some(1)),
        visit("p01", 20, Some(3)),
    ];

    let sequences = build_sequences(&labeled, SequenceOrder::Timestamp);
    assert_eq!(sequences["p01"], vec![1, 2, 3]);
}

#[test]
fn test_ingestion_order_keeps_input_order() {
    let labeled = vec![
        visit("p01", 10, Some(2)),
        visit("p01", 0, Some(1)),
        visit("p01", 20, Some(3)),
    ];

    let sequences = build_sequences(&labeled, SequenceOrder::Ingestion);
    assert_eq!(sequences["p01"], vec![2, 1, 3]);
}

#[test]
fn test_missing_timestamps_keep_ingestion_order() {
    // Stable sort: points without timestamps keep their relative order.
    let labeled = vec![
        LabeledPoint {
            point: Point::new(0.0, 0.0, "p01"),
            cluster: Some(5),
        },
        LabeledPoint {
            point: Point::new(0.0, 0.0, "p01"),
            cluster: Some(6),
        },
    ];

    let sequences = build_sequences(&labeled, SequenceOrder::Timestamp);
    assert_eq!(sequences["p01"], vec![5, 6]);
}

#[test]
fn test_empty_input() {
    let sequences = build_sequences(&[], SequenceOrder::Timestamp);
    assert!(sequences.is_empty());
}
