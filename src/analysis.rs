//! Track analysis pipeline: segments, smoothing, summary
//!
//! `analyze` runs the whole pipeline over one parsed track. It never fails on
//! a track that parsed: a single-point or fully paused track yields empty
//! series and zeroed speed statistics.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{CalculationError, Result};
use crate::import::ImportManager;
use crate::models::{Metrics, Track};
use crate::segments::{compute_segments, DEFAULT_PAUSE_THRESHOLD_SECONDS};
use crate::smoothing::{normalize_speeds, smooth, DEFAULT_SMOOTHING_WINDOW};
use crate::summary::summarize;

/// Tunable analysis parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Gaps longer than this many seconds are treated as pauses
    pub pause_threshold_seconds: f64,

    /// Samples per centered moving-average window
    pub smoothing_window: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            pause_threshold_seconds: DEFAULT_PAUSE_THRESHOLD_SECONDS,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> std::result::Result<(), CalculationError> {
        if !self.pause_threshold_seconds.is_finite() || self.pause_threshold_seconds < 0.0 {
            return Err(CalculationError::InvalidParameter {
                calculation: "track analysis".to_string(),
                parameter: "pause_threshold_seconds".to_string(),
                value: self.pause_threshold_seconds.to_string(),
            });
        }
        if self.smoothing_window == 0 {
            return Err(CalculationError::InvalidParameter {
                calculation: "track analysis".to_string(),
                parameter: "smoothing_window".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Derived series and metrics for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Raw speed of each kept segment, km/h
    pub kept_speeds: Vec<f64>,

    /// Cumulative distance at each kept segment, meters
    pub cumulative_distances_m: Vec<f64>,

    /// Smoothed speeds, same length as `kept_speeds`
    pub smoothed_speeds: Vec<f64>,

    /// Track point index ending each kept segment
    pub segment_end_indices: Vec<usize>,

    /// Segments dropped as pauses
    pub discarded_segments: usize,

    pub metrics: Metrics,
}

impl Analysis {
    /// Cumulative distances in kilometers, for the profile x-axis
    pub fn distances_km(&self) -> Vec<f64> {
        self.cumulative_distances_m.iter().map(|d| d / 1000.0).collect()
    }

    /// Raw speeds scaled onto [0, 1], for colouring the map trace
    pub fn normalized_speeds(&self) -> Vec<f64> {
        normalize_speeds(&self.kept_speeds)
    }
}

/// A parsed track together with its analysis; the unit the cache stores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackAnalysis {
    pub track: Track,
    pub analysis: Analysis,
}

/// Analyze a track with the given pause threshold and the default window
pub fn analyze(track: &Track, pause_threshold_seconds: f64) -> Result<Analysis> {
    analyze_with(
        track,
        &AnalysisOptions {
            pause_threshold_seconds,
            ..AnalysisOptions::default()
        },
    )
}

#[instrument(level = "debug", skip_all, fields(points = track.len()))]
pub fn analyze_with(track: &Track, options: &AnalysisOptions) -> Result<Analysis> {
    options.validate()?;

    let segments = compute_segments(track.points(), options.pause_threshold_seconds);
    let smoothed_speeds = smooth(&segments.speeds, options.smoothing_window)?;
    let metrics = summarize(
        &track.elevations(),
        &smoothed_speeds,
        segments.total_distance,
        segments.total_time_seconds,
    )?;

    debug!(
        distance_km = metrics.total_distance_km,
        average_speed = metrics.average_speed,
        "Track analyzed"
    );

    Ok(Analysis {
        kept_speeds: segments.speeds,
        cumulative_distances_m: segments.cumulative_distances,
        smoothed_speeds,
        segment_end_indices: segments.end_indices,
        discarded_segments: segments.discarded,
        metrics,
    })
}

/// Parse and analyze one file
pub fn analyze_file(
    file_path: &Path,
    importer: &ImportManager,
    options: &AnalysisOptions,
) -> Result<TrackAnalysis> {
    let track = importer.import_file(file_path)?;
    let analysis = analyze_with(&track, options)?;
    Ok(TrackAnalysis { track, analysis })
}
