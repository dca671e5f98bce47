//! Tests for the cluster module

use scanmine::{AnalysisError, Point, cluster};

/// A dense blob of `count` points around (cx, cy), spaced well inside eps.
fn blob(cx: f64, cy: f64, count: usize, participant: &str) -> Vec<Point> {
    (0..count)
        .map(|i| Point::new(cx + (i % 5) as f64, cy + (i / 5) as f64, participant))
        .collect()
}

#[test]
fn test_two_blobs_two_clusters() {
    let mut points = blob(100.0, 100.0, 25, "p01");
    points.extend(blob(500.0, 400.0, 25, "p01"));

    let labeled = cluster(&points, 10.0, 5).unwrap();

    assert_eq!(labeled.len(), 50);
    let labels: std::collections::HashSet<_> =
        labeled.iter().filter_map(|lp| lp.cluster).collect();
    assert_eq!(labels.len(), 2);
    assert!(labeled.iter().all(|lp| !lp.is_noise()));
}

#[test]
fn test_labels_canonical_by_centroid_x() {
    // Right blob first in input order; canonical labels still assign 0 to
    // the leftmost centroid.
    let mut points = blob(500.0, 400.0, 25, "p01");
    points.extend(blob(100.0, 100.0, 25, "p01"));

    let labeled = cluster(&points, 10.0, 5).unwrap();

    let left = labeled.iter().find(|lp| lp.point.x < 300.0).unwrap();
    let right = labeled.iter().find(|lp| lp.point.x > 300.0).unwrap();
    assert_eq!(left.cluster, Some(0));
    assert_eq!(right.cluster, Some(1));
}

#[test]
fn test_deterministic_across_runs() {
    let mut points = blob(100.0, 100.0, 30, "p01");
    points.extend(blob(400.0, 300.0, 30, "p02"));
    points.push(Point::new(5000.0, 5000.0, "p01"));

    let first = cluster(&points, 10.0, 5).unwrap();
    let second = cluster(&points, 10.0, 5).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_isolated_outlier_is_noise() {
    for min_samples in [2, 5, 10] {
        let mut points = blob(100.0, 100.0, 25, "p01");
        points.push(Point::new(9999.0, 9999.0, "p01"));

        let labeled = cluster(&points, 10.0, min_samples).unwrap();
        let outlier = labeled
            .iter()
            .find(|lp| lp.point.x == 9999.0)
            .expect("outlier present in output");
        assert!(outlier.is_noise());
        assert_eq!(outlier.label_i64(), -1);
    }
}

#[test]
fn test_fewer_points_than_min_samples_all_noise() {
    let points = blob(100.0, 100.0, 4, "p01");
    let labeled = cluster(&points, 10.0, 5).unwrap();
    assert_eq!(labeled.len(), 4);
    assert!(labeled.iter().all(|lp| lp.is_noise()));
}

#[test]
fn test_empty_input_yields_empty_output() {
    let labeled = cluster(&[], 10.0, 5).unwrap();
    assert!(labeled.is_empty());
}

#[test]
fn test_nan_points_excluded_entirely() {
    let mut points = blob(100.0, 100.0, 25, "p01");
    points.push(Point::new(f64::NAN, 100.0, "p01"));
    points.push(Point::new(100.0, f64::INFINITY, "p01"));

    let labeled = cluster(&points, 10.0, 5).unwrap();
    assert_eq!(labeled.len(), 25);
    assert!(labeled.iter().all(|lp| lp.point.is_valid()));
}

#[test]
fn test_invalid_parameters_rejected() {
    let points = blob(100.0, 100.0, 10, "p01");

    let err = cluster(&points, 0.0, 5).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidParameter { name: "eps", .. }));

    let err = cluster(&points, -1.0, 5).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidParameter { name: "eps", .. }));

    let err = cluster(&points, 10.0, 0).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::InvalidParameter {
            name: "min_samples",
            ..
        }
    ));
}

#[test]
fn test_density_chain_joins_one_cluster() {
    // A chain of points each within eps of its neighbors forms one cluster
    // through density reachability, even though the ends are far apart.
    let points: Vec<Point> = (0..40)
        .map(|i| Point::new(i as f64 * 5.0, 0.0, "p01"))
        .collect();

    let labeled = cluster(&points, 6.0, 2).unwrap();
    let labels: std::collections::HashSet<_> =
        labeled.iter().filter_map(|lp| lp.cluster).collect();
    assert_eq!(labels.len(), 1);
}
