//! MET-based energy expenditure estimate
//!
//! kcal = MET x weight (kg) x elapsed hours, with the activity's base MET
//! raised by one for hilly tracks and by one for fast tracks.

use crate::error::ProfileIncomplete;
use crate::models::{Activity, Metrics, UserProfile};

/// Elevation range above which the MET is raised, meters
pub const HILLY_ELEVATION_GAIN_M: f64 = 500.0;

/// Average speed above which the MET is raised, km/h
pub const FAST_AVERAGE_SPEED_KMH: f64 = 20.0;

/// Adjusted MET for an activity on a given track
pub fn adjusted_met(activity: Activity, average_speed_kmh: f64, elevation_gain_m: f64) -> f64 {
    let mut met = activity.base_met();
    if elevation_gain_m > HILLY_ELEVATION_GAIN_M {
        met += 1.0;
    }
    if average_speed_kmh > FAST_AVERAGE_SPEED_KMH {
        met += 1.0;
    }
    met
}

/// Estimated energy expenditure in kilocalories.
///
/// Activity, weight and elapsed time are required; weight and time must be
/// finite and positive. Nothing is defaulted.
pub fn estimate_energy(
    activity: Option<Activity>,
    weight_kg: Option<f64>,
    elapsed_seconds: Option<f64>,
    average_speed_kmh: f64,
    elevation_gain_m: f64,
) -> Result<f64, ProfileIncomplete> {
    let activity = activity.ok_or(ProfileIncomplete::new("activity"))?;
    let weight_kg = positive(weight_kg).ok_or(ProfileIncomplete::new("weight_kg"))?;
    let elapsed_seconds =
        positive(elapsed_seconds).ok_or(ProfileIncomplete::new("elapsed_seconds"))?;

    let met = adjusted_met(activity, average_speed_kmh, elevation_gain_m);
    Ok(met * weight_kg * (elapsed_seconds / 3600.0))
}

/// Estimate energy for an analyzed track from the user's profile
pub fn estimate_for_profile(
    profile: &UserProfile,
    metrics: &Metrics,
) -> Result<f64, ProfileIncomplete> {
    estimate_energy(
        profile.activity,
        profile.weight_kg,
        Some(metrics.total_time_seconds),
        metrics.average_speed,
        metrics.elevation_gain(),
    )
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Guess the activity from average speed: above 17 km/h cycling, 7 to 17
/// running, anything slower walking
pub fn suggest_activity(average_speed_kmh: f64) -> Activity {
    if average_speed_kmh > 17.0 {
        Activity::Cycling
    } else if average_speed_kmh >= 7.0 {
        Activity::Running
    } else {
        Activity::Walking
    }
}
