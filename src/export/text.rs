use super::{ExportError, TrackReport};
use std::io::Write;
use std::path::Path;

/// Export a track report to human-readable text format
pub fn export_track_report<P: AsRef<Path>>(
    report: &TrackReport,
    output_path: P,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path)?;
    write_track_report(report, file)
}

/// Write the text rendering of a report to any writer
pub fn write_track_report<W: Write>(report: &TrackReport, mut out: W) -> Result<(), ExportError> {
    let metrics = &report.metrics;

    // Header
    writeln!(out, "=")?;
    writeln!(out, "TRACK REPORT")?;
    writeln!(out, "=")?;
    writeln!(out)?;

    writeln!(out, "Source: {}", report.source)?;
    if let Some(name) = &report.track_name {
        writeln!(out, "Track: {}", name)?;
    }
    writeln!(out, "Started: {}", report.started_at.format("%Y-%m-%d %H:%M:%S %:z"))?;
    writeln!(
        out,
        "Points: {} ({} segments kept, {} discarded as pauses)",
        report.point_count, report.kept_segments, report.discarded_segments
    )?;
    writeln!(out)?;

    writeln!(out, "MOVEMENT")?;
    writeln!(out, "-")?;
    writeln!(out, "Distance: {:.2} km", metrics.total_distance_km)?;
    writeln!(out, "Moving Time: {}", report.total_time)?;
    writeln!(out, "Average Speed: {:.2} km/h", metrics.average_speed)?;
    writeln!(out, "Highest Speed: {:.2} km/h", metrics.highest_speed)?;
    writeln!(out, "Lowest Speed: {:.2} km/h", metrics.lowest_speed)?;
    writeln!(out)?;

    writeln!(out, "ELEVATION")?;
    writeln!(out, "-")?;
    writeln!(out, "Top: {:.0} m", metrics.top_elevation)?;
    writeln!(out, "Lowest: {:.0} m", metrics.lowest_elevation)?;
    writeln!(out, "Range: {:.0} m", report.elevation_gain_m)?;
    writeln!(out)?;

    writeln!(out, "ENERGY")?;
    writeln!(out, "-")?;
    writeln!(out, "Suggested Activity: {}", report.suggested_activity)?;
    match (report.energy_kcal, report.activity) {
        (Some(kcal), Some(activity)) => {
            writeln!(out, "Activity: {}", activity)?;
            writeln!(out, "Estimated Energy: {:.0} kcal", kcal)?;
        }
        _ => {
            let note = report.energy_note.as_deref().unwrap_or("profile incomplete");
            writeln!(out, "Estimated Energy: unavailable ({})", note)?;
        }
    }

    out.flush()?;
    Ok(())
}
