use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::analysis::TrackAnalysis;
use crate::energy::{estimate_for_profile, suggest_activity};
use crate::models::{Activity, Metrics, UserProfile};
use crate::summary::format_duration;

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Result<Self, ExportError> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }

    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_str(ext)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Everything the dashboard shows for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    pub source: String,
    pub track_name: Option<String>,
    pub started_at: DateTime<FixedOffset>,
    pub point_count: usize,
    pub kept_segments: usize,
    pub discarded_segments: usize,
    pub metrics: Metrics,
    /// Kept time as HH:MM:SS
    pub total_time: String,
    pub elevation_gain_m: f64,
    /// Activity guessed from average speed
    pub suggested_activity: Activity,
    /// Activity the estimate was made for
    pub activity: Option<Activity>,
    pub energy_kcal: Option<f64>,
    /// Why the energy estimate is missing, if it is
    pub energy_note: Option<String>,
}

impl TrackReport {
    pub fn new(source: &Path, result: &TrackAnalysis, profile: &UserProfile) -> Self {
        let metrics = result.analysis.metrics;
        let (energy_kcal, energy_note) = match estimate_for_profile(profile, &metrics) {
            Ok(kcal) => (Some(kcal), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            source: source.display().to_string(),
            track_name: result.track.name().map(str::to_string),
            started_at: result.track.start_time(),
            point_count: result.track.len(),
            kept_segments: result.analysis.kept_speeds.len(),
            discarded_segments: result.analysis.discarded_segments,
            metrics,
            total_time: format_duration(metrics.total_time_seconds),
            elevation_gain_m: metrics.elevation_gain(),
            suggested_activity: suggest_activity(metrics.average_speed),
            activity: profile.activity,
            energy_kcal,
            energy_note,
        }
    }
}

/// One row of the elevation/speed profile, one per kept segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub distance_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    pub speed_kmh: f64,
    pub smoothed_speed_kmh: f64,
    /// Raw speed scaled onto [0, 1]
    pub speed_normalized: f64,
    pub timestamp: DateTime<FixedOffset>,
}

/// Profile rows keyed by the point ending each kept segment
pub fn profile_series(result: &TrackAnalysis) -> Vec<ProfilePoint> {
    let analysis = &result.analysis;
    let points = result.track.points();
    let normalized = analysis.normalized_speeds();

    analysis
        .segment_end_indices
        .iter()
        .enumerate()
        .map(|(i, &end)| {
            let point = &points[end];
            ProfilePoint {
                distance_km: analysis.cumulative_distances_m[i] / 1000.0,
                latitude: point.latitude,
                longitude: point.longitude,
                elevation_m: point.elevation,
                speed_kmh: analysis.kept_speeds[i],
                smoothed_speed_kmh: analysis.smoothed_speeds[i],
                speed_normalized: normalized[i],
                timestamp: point.timestamp,
            }
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_result;
    use super::*;

    #[test]
    fn test_export_format_parsing() {
        assert_eq!(ExportFormat::from_str("JSON").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")).unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::from_str("pdf").is_err());
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_report_with_incomplete_profile() {
        let result = sample_result();
        let report = TrackReport::new(Path::new("hill.gpx"), &result, &UserProfile::default());

        assert_eq!(report.point_count, 5);
        assert_eq!(report.kept_segments, 3);
        assert_eq!(report.discarded_segments, 1);
        assert_eq!(report.total_time, "00:00:30");
        assert_eq!(report.elevation_gain_m, 25.0);
        assert_eq!(report.track_name.as_deref(), Some("Hill loop"));
        assert!(report.energy_kcal.is_none());
        assert!(report.energy_note.unwrap().contains("activity"));
    }

    #[test]
    fn test_report_with_profile() {
        let result = sample_result();
        let profile = UserProfile {
            weight_kg: Some(60.0),
            activity: Some(Activity::Running),
            ..Default::default()
        };
        let report = TrackReport::new(Path::new("hill.gpx"), &result, &profile);

        // ~20 km/h average puts the run just over the fast threshold
        let expected = crate::energy::estimate_energy(
            Some(Activity::Running),
            Some(60.0),
            Some(30.0),
            report.metrics.average_speed,
            25.0,
        )
        .unwrap();
        assert_eq!(report.energy_kcal, Some(expected));
        assert!(report.energy_note.is_none());
    }

    #[test]
    fn test_profile_series_rows() {
        let result = sample_result();
        let rows = profile_series(&result);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].elevation_m, 415.0);
        assert_eq!(rows[2].elevation_m, 420.0);
        assert!(rows[0].distance_km < rows[2].distance_km);
        assert_eq!(rows[1].smoothed_speed_kmh, result.analysis.smoothed_speeds[1]);
    }
}
