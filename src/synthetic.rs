//! Synthetic gaze data generator for testing and benchmarking.
//!
//! Generates datasets with known attention hotspots and per-participant
//! visit itineraries, providing ground truth for validating clustering,
//! sequence construction, and rule mining.
//!
//! # Example
//!
//! ```rust
//! use scanmine::synthetic::{GazeScenario, Hotspot};
//!
//! let scenario = GazeScenario {
//!     hotspots: vec![
//!         Hotspot { x: 200.0, y: 150.0, sigma: 8.0 },
//!         Hotspot { x: 600.0, y: 400.0, sigma: 8.0 },
//!     ],
//!     participant_count: 10,
//!     visits_per_participant: 4,
//!     points_per_visit: 20,
//!     noise_points_per_participant: 5,
//!     field_width: 1024.0,
//!     field_height: 768.0,
//!     seed: 42,
//! };
//!
//! let dataset = scenario.generate();
//! assert_eq!(dataset.itineraries.len(), 10);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::f64::consts::PI;

use crate::Point;

/// An attention hotspot: a 2D Gaussian blob of gaze points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    /// Standard deviation of the point scatter around the center.
    pub sigma: f64,
}

/// Metadata about a generated dataset.
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    /// Total points across all participants, including noise.
    pub total_points: usize,
    /// Points generated inside hotspots.
    pub hotspot_points: usize,
    /// Uniform background points.
    pub noise_points: usize,
}

/// A complete synthetic dataset with ground truth.
pub struct SyntheticGazeDataset {
    /// Generated points, timestamped in visit order per participant.
    pub points: Vec<Point>,
    /// Ground truth: the hotspot index sequence each participant visited,
    /// with no immediate repeats.
    pub itineraries: HashMap<String, Vec<usize>>,
    /// Dataset statistics.
    pub metadata: DatasetMetadata,
}

/// Scenario configuration for generating synthetic gaze data.
#[derive(Debug, Clone)]
pub struct GazeScenario {
    /// Hotspots participants move between (ground truth clusters).
    pub hotspots: Vec<Hotspot>,
    /// Number of participants to generate.
    pub participant_count: usize,
    /// Hotspot visits per participant.
    pub visits_per_participant: usize,
    /// Gaze points sampled per visit.
    pub points_per_visit: usize,
    /// Uniform background points per participant, far from any itinerary
    /// structure, labeled noise under sensible clustering parameters.
    pub noise_points_per_participant: usize,
    /// Width of the stimulus field for background noise.
    pub field_width: f64,
    /// Height of the stimulus field for background noise.
    pub field_height: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl GazeScenario {
    /// Generate a complete synthetic dataset from this scenario.
    pub fn generate(&self) -> SyntheticGazeDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut points: Vec<Point> = Vec::new();
        let mut itineraries: HashMap<String, Vec<usize>> = HashMap::new();
        let mut hotspot_points = 0usize;
        let mut noise_points = 0usize;

        for participant_idx in 0..self.participant_count {
            let participant = format!("synth_p{:03}", participant_idx);
            let itinerary = self.generate_itinerary(&mut rng);

            let mut timestamp: i64 = 0;
            for &hotspot_idx in &itinerary {
                let hotspot = &self.hotspots[hotspot_idx];
                for _ in 0..self.points_per_visit {
                    let (dx, dy) = gaussian_pair(&mut rng);
                    points.push(Point::with_timestamp(
                        hotspot.x + dx * hotspot.sigma,
                        hotspot.y + dy * hotspot.sigma,
                        &participant,
                        timestamp,
                    ));
                    timestamp += 1;
                    hotspot_points += 1;
                }
            }

            for _ in 0..self.noise_points_per_participant {
                points.push(Point::with_timestamp(
                    rng.gen_range(0.0..self.field_width),
                    rng.gen_range(0.0..self.field_height),
                    &participant,
                    timestamp,
                ));
                timestamp += 1;
                noise_points += 1;
            }

            itineraries.insert(participant, itinerary);
        }

        let total_points = points.len();
        SyntheticGazeDataset {
            points,
            itineraries,
            metadata: DatasetMetadata {
                total_points,
                hotspot_points,
                noise_points,
            },
        }
    }

    /// Pick a hotspot visit order with no immediate repeats, so the ground
    /// truth matches the collapsed sequences the pipeline produces.
    fn generate_itinerary(&self, rng: &mut StdRng) -> Vec<usize> {
        let n = self.hotspots.len();
        let mut itinerary = Vec::with_capacity(self.visits_per_participant);
        for _ in 0..self.visits_per_participant {
            if n == 0 {
                break;
            }
            let mut next = rng.gen_range(0..n);
            if n > 1 && itinerary.last() == Some(&next) {
                next = (next + 1) % n;
            }
            itinerary.push(next);
        }
        itinerary
    }
}

/// One pair of independent standard-normal samples (Box-Muller transform).
fn gaussian_pair(rng: &mut StdRng) -> (f64, f64) {
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.r#gen();
    let r = (-2.0 * u1.ln()).sqrt();
    (r * (2.0 * PI * u2).cos(), r * (2.0 * PI * u2).sin())
}
