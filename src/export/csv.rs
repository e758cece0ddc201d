use super::{ExportError, ProfilePoint};
use std::io::Write;
use std::path::Path;

/// Export the elevation/speed profile to CSV, one row per kept segment
pub fn export_profile<P: AsRef<Path>>(
    profile: &[ProfilePoint],
    output_path: P,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path)?;
    write_profile(profile, file)
}

/// Write profile rows as CSV with a header line
pub fn write_profile<W: Write>(profile: &[ProfilePoint], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for point in profile {
        csv_writer
            .serialize(point)
            .map_err(|e| ExportError::SerializationError(e.to_string()))?;
    }

    csv_writer.flush()?;
    Ok(())
}
