use super::{ExportError, ProfilePoint, TrackReport};
use std::io::Write;
use std::path::Path;

/// Export a track report to JSON format
pub fn export_track_report<P: AsRef<Path>>(
    report: &TrackReport,
    output_path: P,
) -> Result<(), ExportError> {
    export_json(report, output_path)
}

/// Export the elevation/speed profile to JSON format
pub fn export_profile<P: AsRef<Path>>(
    profile: &[ProfilePoint],
    output_path: P,
) -> Result<(), ExportError> {
    export_json(&profile, output_path)
}

/// Render any serializable value as pretty JSON
pub fn to_json_string<T: serde::Serialize>(data: &T) -> Result<String, ExportError> {
    serde_json::to_string_pretty(data).map_err(|e| ExportError::SerializationError(e.to_string()))
}

/// Export any serializable data structure to JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = to_json_string(data)?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::profile_series;
    use crate::export::test_support::sample_result;
    use crate::models::UserProfile;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_track_report() {
        let result = sample_result();
        let report = TrackReport::new(Path::new("hill.gpx"), &result, &UserProfile::default());

        let temp_file = NamedTempFile::new().unwrap();
        export_track_report(&report, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("\"source\": \"hill.gpx\""));
        assert!(content.contains("\"total_time\": \"00:00:30\""));
        assert!(content.contains("\"energy_kcal\": null"));

        let parsed: TrackReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.kept_segments, 3);
    }

    #[test]
    fn test_export_profile() {
        let rows = profile_series(&sample_result());

        let temp_file = NamedTempFile::new().unwrap();
        export_profile(&rows, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let parsed: Vec<ProfilePoint> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].elevation_m, 420.0);
    }
}
