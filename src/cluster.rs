//! Density-based spatial clustering (DBSCAN) over 2D point sets.
//!
//! Two points belong to the same cluster when they are connected through a
//! chain of points that each have at least `min_samples` neighbors
//! (including themselves) within radius `eps`. Points outside any such
//! dense neighborhood are noise.
//!
//! Neighbor queries go through an R-tree, so a full run is
//! O(n log n) for well-spread data instead of the naive O(n^2).

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use std::collections::VecDeque;

use crate::error::{AnalysisError, Result};
use crate::{LabeledPoint, Point};

/// A point with its index into the usable-point list, for R-tree queries.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    x: f64,
    y: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Per-point state during the scan.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    Noise,
    Cluster(u32),
}

/// Cluster a 2D point set with DBSCAN semantics.
///
/// Points with missing or non-finite coordinates are excluded entirely:
/// they are not passed to the algorithm and never appear in the output.
/// An empty (or fully invalid) input yields an empty output, not an error;
/// rejecting empty datasets is the pipeline's concern.
///
/// The result is deterministic for a fixed input order, and labels are
/// canonicalized by ascending centroid x-coordinate, so identical inputs
/// produce identical label numbers across runs.
///
/// # Errors
/// [`AnalysisError::InvalidParameter`] if `eps <= 0` or `min_samples < 1`.
pub fn cluster(points: &[Point], eps: f64, min_samples: usize) -> Result<Vec<LabeledPoint>> {
    if !(eps > 0.0) {
        return Err(AnalysisError::invalid_parameter(
            "eps",
            eps,
            "must be > 0",
        ));
    }
    if min_samples < 1 {
        return Err(AnalysisError::invalid_parameter(
            "min_samples",
            min_samples,
            "must be >= 1",
        ));
    }

    let usable: Vec<&Point> = points.iter().filter(|p| p.is_valid()).collect();
    if usable.is_empty() {
        return Ok(Vec::new());
    }

    let tree = build_rtree(&usable);
    let eps_2 = eps * eps;
    let mut marks = vec![Mark::Unvisited; usable.len()];
    let mut next_label: u32 = 0;

    for i in 0..usable.len() {
        if marks[i] != Mark::Unvisited {
            continue;
        }

        let neighbors = range_query(&tree, usable[i], eps_2);
        if neighbors.len() < min_samples {
            marks[i] = Mark::Noise;
            continue;
        }

        // i is a core point: start a new cluster and expand it.
        let label = next_label;
        next_label += 1;
        marks[i] = Mark::Cluster(label);

        let mut seeds: VecDeque<usize> = neighbors.into_iter().filter(|&j| j != i).collect();
        while let Some(j) = seeds.pop_front() {
            match marks[j] {
                // Border point previously dismissed as noise joins the cluster.
                Mark::Noise => marks[j] = Mark::Cluster(label),
                Mark::Unvisited => {
                    marks[j] = Mark::Cluster(label);
                    let j_neighbors = range_query(&tree, usable[j], eps_2);
                    if j_neighbors.len() >= min_samples {
                        seeds.extend(j_neighbors);
                    }
                }
                Mark::Cluster(_) => {}
            }
        }
    }

    let remap = canonical_label_order(&usable, &marks, next_label);

    Ok(usable
        .iter()
        .zip(marks.iter())
        .map(|(&point, mark)| LabeledPoint {
            point: point.clone(),
            cluster: match mark {
                Mark::Cluster(label) => Some(remap[*label as usize]),
                Mark::Noise => None,
                Mark::Unvisited => unreachable!("every point is marked after the scan"),
            },
        })
        .collect())
}

/// Build an R-tree over the usable points for neighbor queries.
fn build_rtree(points: &[&Point]) -> RTree<IndexedPoint> {
    let indexed: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(i, p)| IndexedPoint {
            idx: i,
            x: p.x,
            y: p.y,
        })
        .collect();
    RTree::bulk_load(indexed)
}

/// Indices of all points within `eps` of `center`, including `center` itself.
fn range_query(tree: &RTree<IndexedPoint>, center: &Point, eps_2: f64) -> Vec<usize> {
    tree.locate_within_distance([center.x, center.y], eps_2)
        .map(|p| p.idx)
        .collect()
}

/// Map scan-order labels to canonical ids sorted by ascending centroid x.
///
/// Scan-order labels depend on which core point is reached first, which is
/// stable for a fixed input order but not meaningful. Sorting by centroid x
/// (y, then scan label, as tie-breakers) makes label numbers reproducible
/// across runs on identical input.
fn canonical_label_order(points: &[&Point], marks: &[Mark], num_labels: u32) -> Vec<u32> {
    let mut sum_x = vec![0.0f64; num_labels as usize];
    let mut sum_y = vec![0.0f64; num_labels as usize];
    let mut counts = vec![0usize; num_labels as usize];

    for (point, mark) in points.iter().zip(marks.iter()) {
        if let Mark::Cluster(label) = mark {
            sum_x[*label as usize] += point.x;
            sum_y[*label as usize] += point.y;
            counts[*label as usize] += 1;
        }
    }

    let mut order: Vec<u32> = (0..num_labels).collect();
    order.sort_by(|&a, &b| {
        let (ax, ay) = centroid_of(a, &sum_x, &sum_y, &counts);
        let (bx, by) = centroid_of(b, &sum_x, &sum_y, &counts);
        ax.total_cmp(&bx).then(ay.total_cmp(&by)).then(a.cmp(&b))
    });

    let mut remap = vec![0u32; num_labels as usize];
    for (canonical, &scan_label) in order.iter().enumerate() {
        remap[scan_label as usize] = canonical as u32;
    }
    remap
}

fn centroid_of(label: u32, sum_x: &[f64], sum_y: &[f64], counts: &[usize]) -> (f64, f64) {
    let n = counts[label as usize] as f64;
    (sum_x[label as usize] / n, sum_y[label as usize] / n)
}
