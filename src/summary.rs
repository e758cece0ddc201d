use crate::error::DataError;
use crate::models::Metrics;

/// Reduce smoothed speeds, raw elevations and totals into a `Metrics` record.
///
/// Speed statistics are 0 when no segment was kept. Elevation extremes come
/// from every track point and require at least one.
pub fn summarize(
    elevations: &[f64],
    smoothed_speeds: &[f64],
    total_distance_m: f64,
    total_time_seconds: f64,
) -> Result<Metrics, DataError> {
    let (top_elevation, lowest_elevation) = min_max(elevations)
        .map(|(min, max)| (max, min))
        .ok_or(DataError::NoElevations)?;

    let (highest_speed, lowest_speed, average_speed) = match min_max(smoothed_speeds) {
        Some((min, max)) => {
            let mean = smoothed_speeds.iter().sum::<f64>() / smoothed_speeds.len() as f64;
            (max, min, mean)
        }
        None => (0.0, 0.0, 0.0),
    };

    Ok(Metrics {
        highest_speed,
        lowest_speed,
        average_speed,
        total_time_seconds,
        top_elevation,
        lowest_elevation,
        total_distance_km: total_distance_m / 1000.0,
    })
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v))),
    )
}

/// Format seconds as `HH:MM:SS`; hours are not wrapped at 24
pub fn format_duration(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
