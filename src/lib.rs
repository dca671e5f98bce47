//! # Scanmine
//!
//! Spatial clustering and ordinal association-rule mining for
//! eye-tracking gaze and fixation data.
//!
//! This library provides:
//! - Density-based (DBSCAN) clustering of 2D gaze/fixation point clouds
//! - Per-cluster centroid computation
//! - Per-participant cluster-visit sequence construction
//! - Ordinal association-rule mining with support/confidence scoring
//! - Monte Carlo permutation testing of rule significance
//! - Synthetic gaze dataset generation for testing and benchmarking
//!
//! ## Features
//!
//! - **`parallel`** (default) - Run Monte Carlo trials across rayon worker threads
//!
//! ## Quick Start
//!
//! ```rust
//! use scanmine::{AnalysisParams, CancelToken, NoopProgress, Point, run_analysis};
//!
//! // Two participants fixating two regions of a stimulus
//! let mut points = Vec::new();
//! for i in 0..20 {
//!     let jitter = i as f64 * 0.1;
//!     points.push(Point::with_timestamp(100.0 + jitter, 100.0, "p01", i));
//!     points.push(Point::with_timestamp(400.0, 300.0 + jitter, "p01", 100 + i));
//!     points.push(Point::with_timestamp(400.0 + jitter, 300.0, "p02", i));
//!     points.push(Point::with_timestamp(100.0, 100.0 + jitter, "p02", 100 + i));
//! }
//!
//! let params = AnalysisParams {
//!     eps: 10.0,
//!     min_samples: 5,
//!     ..AnalysisParams::default()
//! };
//!
//! let result = run_analysis(&points, &params, &NoopProgress, &CancelToken::new()).unwrap();
//! assert_eq!(result.centroids.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{AnalysisError, Result};

// Raw record ingestion and coordinate extraction
pub mod dataset;
pub use dataset::{DataKind, RawRecord};

// Density-based spatial clustering
pub mod cluster;
pub use cluster::cluster;

// Per-cluster centroid computation
pub mod centroid;
pub use centroid::centroids;

// Per-participant cluster-visit sequences
pub mod sequence;
pub use sequence::{SequenceOrder, build_sequences};

// Ordinal association-rule mining and scoring
pub mod mining;
pub use mining::{MiningResult, compute_statistics, mine};

// Progress reporting and cooperative cancellation
pub mod progress;
pub use progress::{AtomicProgressTracker, CancelToken, MonteCarloProgress, NoopProgress};

// Monte Carlo permutation testing
pub mod montecarlo;
#[cfg(feature = "parallel")]
pub use montecarlo::estimate_p_values_parallel;
pub use montecarlo::{MonteCarloConfig, MonteCarloResult, estimate_p_values};

// End-to-end analysis pipeline
pub mod pipeline;
pub use pipeline::{AnalysisParams, AnalysisResult, RuleFilter, run_analysis};

// Synthetic gaze data generator for tests and benchmarks
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A single gaze or fixation observation on the stimulus plane.
///
/// Immutable once ingested. `duration` is carried for rendering only;
/// clustering and mining never read it.
///
/// # Example
/// ```
/// use scanmine::Point;
/// let point = Point::new(512.0, 384.0, "p01");
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Identifier of the participant this observation belongs to.
    pub participant: String,
    /// Recording timestamp, if the source data carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Fixation duration in milliseconds (fixation data only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl Point {
    /// Create a new point without timestamp or duration.
    pub fn new(x: f64, y: f64, participant: &str) -> Self {
        Self {
            x,
            y,
            participant: participant.to_string(),
            timestamp: None,
            duration: None,
        }
    }

    /// Create a new point with a timestamp.
    pub fn with_timestamp(x: f64, y: f64, participant: &str, timestamp: i64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::new(x, y, participant)
        }
    }

    /// Check that both coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point together with its cluster assignment from one clustering run.
///
/// `cluster` is `None` for noise points. A new clustering run produces an
/// entirely new set of labeled points; labels are never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub point: Point,
    /// Cluster id, or `None` for noise.
    pub cluster: Option<u32>,
}

impl LabeledPoint {
    /// True if this point was not dense enough to join any cluster.
    pub fn is_noise(&self) -> bool {
        self.cluster.is_none()
    }

    /// Label using the conventional integer encoding: cluster id, or -1 for noise.
    pub fn label_i64(&self) -> i64 {
        match self.cluster {
            Some(id) => id as i64,
            None => -1,
        }
    }
}

/// A directional ordinal association rule: the first cluster is visited
/// before the second within the same participant's sequence.
pub type Rule = (u32, u32);

/// Support, confidence, and significance scores for one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleStatistics {
    /// Number of participants whose sequence exhibits the rule.
    pub count: u32,
    /// `count / total_distinct_rules`. Normalized over the number of
    /// distinct rules, not the number of participants: supports sum to 1.0
    /// across the rule set, and downstream thresholds are calibrated
    /// against that scale.
    pub support: f64,
    /// `count / participants_visiting(from)`.
    pub forward_confidence: f64,
    /// `count / participants_visiting(to)`.
    pub backward_confidence: f64,
    /// Empirical p-value from the Monte Carlo test, once computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
}
