//! Per-segment distance, time and speed with pause filtering
//!
//! A segment is the stretch between two consecutive track points. Segments
//! whose time gap exceeds the pause threshold are treated as a recording gap
//! (device paused) and dropped from every output, not counted as a stall.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo;
use crate::models::TrackPoint;

/// Default maximum gap between two fixes before a segment counts as a pause
pub const DEFAULT_PAUSE_THRESHOLD_SECONDS: f64 = 60.0;

/// m/s to km/h
const MPS_TO_KMH: f64 = 3.6;

/// Kept segments of one track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentSeries {
    /// Instantaneous speed of each kept segment, km/h
    pub speeds: Vec<f64>,

    /// Cumulative distance at the end of each kept segment, meters
    pub cumulative_distances: Vec<f64>,

    /// Index of the point that ends each kept segment
    pub end_indices: Vec<usize>,

    /// Sum of kept segment distances, meters
    pub total_distance: f64,

    /// Sum of kept segment time gaps, seconds
    pub total_time_seconds: f64,

    /// Number of segments dropped as pauses
    pub discarded: usize,
}

impl SegmentSeries {
    pub fn kept(&self) -> usize {
        self.speeds.len()
    }
}

/// Walk consecutive point pairs and accumulate kept segments.
///
/// Segments with a negative time gap (out-of-order fixes let through by the
/// parser) are discarded like pauses.
pub fn compute_segments(points: &[TrackPoint], pause_threshold_seconds: f64) -> SegmentSeries {
    let mut series = SegmentSeries::default();

    for (i, pair) in points.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);
        let time_diff = time_delta_seconds(prev, curr);

        if time_diff > pause_threshold_seconds || time_diff < 0.0 {
            series.discarded += 1;
            continue;
        }

        let distance = geo::distance(prev, curr);
        let speed = if time_diff > 0.0 {
            distance / time_diff * MPS_TO_KMH
        } else {
            0.0
        };

        series.total_distance += distance;
        series.total_time_seconds += time_diff;
        series.speeds.push(speed);
        series.cumulative_distances.push(series.total_distance);
        series.end_indices.push(i + 1);
    }

    debug!(
        kept = series.kept(),
        discarded = series.discarded,
        total_distance_m = series.total_distance,
        "Computed track segments"
    );

    series
}

/// Seconds between two fixes, with sub-second precision
fn time_delta_seconds(prev: &TrackPoint, curr: &TrackPoint) -> f64 {
    let delta = curr.timestamp - prev.timestamp;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_seconds() as f64,
    }
}
