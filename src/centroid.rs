//! Per-cluster centroid computation.

use std::collections::HashMap;

use crate::error::{AnalysisError, Result};
use crate::LabeledPoint;

/// Compute the arithmetic-mean centroid of every non-noise cluster.
///
/// Returns one `(x, y)` entry per distinct cluster id present in the input.
/// Noise points are excluded from every mean.
///
/// # Errors
/// [`AnalysisError::EmptyCluster`] if the input contains zero non-noise
/// points. Callers that have already checked for an all-noise partition
/// should skip the call instead of handling the error.
pub fn centroids(labeled: &[LabeledPoint]) -> Result<HashMap<u32, (f64, f64)>> {
    let mut sums: HashMap<u32, (f64, f64, usize)> = HashMap::new();

    for lp in labeled {
        if let Some(id) = lp.cluster {
            let entry = sums.entry(id).or_insert((0.0, 0.0, 0));
            entry.0 += lp.point.x;
            entry.1 += lp.point.y;
            entry.2 += 1;
        }
    }

    if sums.is_empty() {
        return Err(AnalysisError::EmptyCluster);
    }

    Ok(sums
        .into_iter()
        .map(|(id, (sx, sy, n))| (id, (sx / n as f64, sy / n as f64)))
        .collect())
}
