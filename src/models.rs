use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Activity types supported by the energy estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Running,
    Cycling,
    Walking,
    /// Any activity without a dedicated MET value
    #[serde(other)]
    Other,
}

impl Activity {
    /// Base metabolic equivalent for the activity
    pub fn base_met(&self) -> f64 {
        match self {
            Activity::Running => 9.8,
            Activity::Cycling => 7.5,
            Activity::Walking => 3.8,
            Activity::Other => 1.0,
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activity::Running => write!(f, "Running"),
            Activity::Cycling => write!(f, "Cycling"),
            Activity::Walking => write!(f, "Walking"),
            Activity::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for Activity {
    type Err = String;

    /// Unknown names map to `Activity::Other`; only blank input is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Err("Activity name is empty".to_string()),
            "running" | "run" => Ok(Activity::Running),
            "cycling" | "ride" | "bike" => Ok(Activity::Cycling),
            "walking" | "walk" => Ok(Activity::Walking),
            _ => Ok(Activity::Other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(format!("Invalid sex: {}", s)),
        }
    }
}

/// User attributes supplied per request; never stored by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Body weight in kilograms
    pub weight_kg: Option<f64>,

    /// Selected activity type
    pub activity: Option<Activity>,

    /// Height in centimeters
    pub height_cm: Option<f64>,

    pub age: Option<u32>,

    pub sex: Option<Sex>,
}

/// A single recorded GPS fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude in degrees, within [-90, 90]
    pub latitude: f64,

    /// Longitude in degrees, within [-180, 180]
    pub longitude: f64,

    /// Elevation in meters above sea level
    pub elevation: f64,

    /// Absolute time of the fix, normalized to UTC by the GPX reader
    pub timestamp: DateTime<FixedOffset>,
}

/// Ordered, non-empty sequence of track points in temporal order.
///
/// Built by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    name: Option<String>,
    points: Vec<TrackPoint>,
}

impl Track {
    /// Returns `None` for an empty point list
    pub fn new(name: Option<String>, points: Vec<TrackPoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self { name, points })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the track has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Elevation of every point, including points of discarded segments
    pub fn elevations(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.elevation).collect()
    }

    /// (latitude, longitude) pairs for the map trace
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.latitude, p.longitude)).collect()
    }

    /// Middle point of the track, used to centre the map view
    pub fn midpoint(&self) -> &TrackPoint {
        &self.points[self.points.len() / 2]
    }

    pub fn start_time(&self) -> DateTime<FixedOffset> {
        self.points[0].timestamp
    }
}

/// Top-line statistics for one analyzed track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Highest smoothed speed in km/h
    pub highest_speed: f64,

    /// Lowest smoothed speed in km/h
    pub lowest_speed: f64,

    /// Mean of the smoothed speeds in km/h
    pub average_speed: f64,

    /// Elapsed time over kept segments only, in seconds
    pub total_time_seconds: f64,

    /// Highest elevation over all points, in meters
    pub top_elevation: f64,

    /// Lowest elevation over all points, in meters
    pub lowest_elevation: f64,

    /// Distance over kept segments, in kilometers
    pub total_distance_km: f64,
}

impl Metrics {
    /// Elevation range of the track (top minus lowest), in meters
    pub fn elevation_gain(&self) -> f64 {
        self.top_elevation - self.lowest_elevation
    }
}
