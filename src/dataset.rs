//! Raw record ingestion and coordinate extraction.
//!
//! Eye-tracker exports carry both gaze-sample and fixation columns in the
//! same rows. Which pair of columns to cluster on is decided once, at
//! pipeline entry, by picking a [`DataKind`]; downstream stages only ever
//! see plain [`Point`]s.

use serde::{Deserialize, Serialize};

use crate::Point;

/// One row of an eye-tracker export, before coordinate extraction.
///
/// Only the columns the analysis reads are modeled; loaders are free to
/// drop everything else. Missing values are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub participant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaze_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaze_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixation_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixation_y: Option<f64>,
}

/// Which coordinate columns an analysis run clusters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Raw gaze samples: one point per usable row.
    Gaze,
    /// Fixations: consecutive rows repeating the same fixation coordinates
    /// collapse into one point whose duration accumulates the timestamp
    /// deltas of the run.
    Fixation,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Gaze => "gaze",
            DataKind::Fixation => "fixation",
        }
    }

    /// Apply this kind's coordinate-extraction rule to a record stream.
    ///
    /// Rows with a missing or non-finite coordinate pair are dropped here,
    /// so clustering and sequence construction see the same filtered view.
    pub fn extract_points(&self, records: &[RawRecord]) -> Vec<Point> {
        match self {
            DataKind::Gaze => extract_gaze_points(records),
            DataKind::Fixation => extract_fixations(records),
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn extract_gaze_points(records: &[RawRecord]) -> Vec<Point> {
    records
        .iter()
        .filter_map(|r| {
            let (x, y) = finite_pair(r.gaze_x, r.gaze_y)?;
            Some(Point {
                x,
                y,
                participant: r.participant.clone(),
                timestamp: r.timestamp,
                duration: None,
            })
        })
        .collect()
}

/// An in-progress fixation run while walking the record stream.
struct FixationRun {
    point: Point,
    last_timestamp: Option<i64>,
}

/// Collapse consecutive rows that repeat the same fixation coordinates for
/// the same participant into a single fixation point. The duration is the
/// sum of timestamp deltas across the run; the timestamp is the run's
/// first. Rows without fixation coordinates end the current run.
fn extract_fixations(records: &[RawRecord]) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::new();
    let mut current: Option<FixationRun> = None;

    for record in records {
        let coords = finite_pair(record.fixation_x, record.fixation_y);

        if let Some(run) = &mut current {
            let continues = match coords {
                Some((x, y)) => {
                    x == run.point.x
                        && y == run.point.y
                        && record.participant == run.point.participant
                }
                None => false,
            };
            if continues {
                if let (Some(prev), Some(now)) = (run.last_timestamp, record.timestamp) {
                    let duration = run.point.duration.get_or_insert(0.0);
                    *duration += (now - prev) as f64;
                }
                run.last_timestamp = record.timestamp;
                continue;
            }
        }
        if let Some(run) = current.take() {
            points.push(run.point);
        }

        if let Some((x, y)) = coords {
            current = Some(FixationRun {
                point: Point {
                    x,
                    y,
                    participant: record.participant.clone(),
                    timestamp: record.timestamp,
                    duration: Some(0.0),
                },
                last_timestamp: record.timestamp,
            });
        }
    }

    if let Some(run) = current {
        points.push(run.point);
    }

    points
}

fn finite_pair(x: Option<f64>, y: Option<f64>) -> Option<(f64, f64)> {
    match (x, y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
        _ => None,
    }
}
