use chrono::{DateTime, FixedOffset};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::{DataError, ParseError, Result, TrailError};
use gpx::errors::GpxError;
use crate::import::{ImportFormat, TimestampPolicy};
use crate::models::{Track, TrackPoint};

/// GPX importer for recorded GPS tracks
#[derive(Debug, Clone, Default)]
pub struct GpxImporter {
    timestamp_policy: TimestampPolicy,
}

impl GpxImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp_policy(timestamp_policy: TimestampPolicy) -> Self {
        Self { timestamp_policy }
    }

    /// Decode a GPX document from any reader.
    ///
    /// Points of every track and segment are flattened in document order.
    /// A point without elevation or time rejects the whole track.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Track> {
        let document = gpx::read(reader).map_err(decode_error)?;

        if document.tracks.is_empty() {
            return Err(missing("track").into());
        }
        if document.tracks.iter().all(|t| t.segments.is_empty()) {
            return Err(missing("track segment").into());
        }

        let name = document.tracks.iter().find_map(|t| t.name.clone());
        let mut points = Vec::new();

        for waypoint in document
            .tracks
            .iter()
            .flat_map(|t| &t.segments)
            .flat_map(|s| &s.points)
        {
            let index = points.len();
            let position = waypoint.point();
            let (latitude, longitude) = (position.y(), position.x());

            let elevation = waypoint
                .elevation
                .ok_or(DataError::MissingElevation { index })?;
            let time = waypoint
                .time
                .clone()
                .ok_or(DataError::MissingTimestamp { index })?;

            points.push(TrackPoint {
                latitude,
                longitude,
                elevation,
                timestamp: to_chrono(OffsetDateTime::from(time))?,
            });
        }

        self.apply_timestamp_policy(&mut points)?;

        Track::new(name, points).ok_or_else(|| missing("track point").into())
    }

    fn apply_timestamp_policy(&self, points: &mut [TrackPoint]) -> Result<()> {
        let out_of_order = points
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
            .map(|i| i + 1);

        let Some(index) = out_of_order else {
            return Ok(());
        };

        match self.timestamp_policy {
            TimestampPolicy::Reject => Err(DataError::TimestampOutOfOrder { index }.into()),
            TimestampPolicy::Sort => {
                warn!(first_out_of_order = index, "Sorting track points by timestamp");
                points.sort_by_key(|p| p.timestamp);
                Ok(())
            }
            TimestampPolicy::Allow => {
                warn!(
                    first_out_of_order = index,
                    "Track timestamps are not monotonic; backwards segments will be discarded"
                );
                Ok(())
            }
        }
    }
}

impl ImportFormat for GpxImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase() == "gpx")
            .unwrap_or(false)
    }

    fn import_file(&self, file_path: &Path) -> Result<Track> {
        let file = File::open(file_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ParseError::FileNotFound {
                path: file_path.to_path_buf(),
            },
            _ => ParseError::Unreadable {
                path: file_path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        let track = self.parse_reader(BufReader::new(file))?;
        info!(
            file = %file_path.display(),
            points = track.len(),
            "Parsed GPX track"
        );
        Ok(track)
    }

    fn get_format_name(&self) -> &'static str {
        "GPX"
    }
}

/// Coordinate bounds are enforced by the gpx reader; report them as data errors
fn decode_error(err: GpxError) -> TrailError {
    match err {
        GpxError::LonLatOutOfBoundsError(coordinate, _, value) => DataError::CoordinateOutOfRange {
            coordinate: coordinate.to_lowercase(),
            value,
        }
        .into(),
        other => ParseError::Malformed {
            reason: other.to_string(),
        }
        .into(),
    }
}

fn missing(what: &str) -> ParseError {
    ParseError::MissingStructure {
        what: what.to_string(),
    }
}

fn to_chrono(time: OffsetDateTime) -> std::result::Result<DateTime<FixedOffset>, ParseError> {
    let offset = FixedOffset::east_opt(time.offset().whole_seconds());
    let utc = DateTime::from_timestamp(time.unix_timestamp(), time.nanosecond());

    match (offset, utc) {
        (Some(offset), Some(utc)) => Ok(utc.with_timezone(&offset)),
        _ => Err(ParseError::Malformed {
            reason: format!("timestamp out of range: {}", time),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="trailstat-tests" xmlns="http://www.topografix.com/GPX/1/1">"#;

    fn document(body: &str) -> String {
        format!("{}\n{}\n</gpx>", HEADER, body)
    }

    fn trkpt(lat: f64, lon: f64, ele: Option<f64>, time: Option<&str>) -> String {
        let mut inner = String::new();
        if let Some(ele) = ele {
            inner.push_str(&format!("<ele>{}</ele>", ele));
        }
        if let Some(time) = time {
            inner.push_str(&format!("<time>{}</time>", time));
        }
        format!(r#"<trkpt lat="{}" lon="{}">{}</trkpt>"#, lat, lon, inner)
    }

    fn parse(xml: &str) -> Result<Track> {
        GpxImporter::new().parse_reader(xml.as_bytes())
    }

    #[test]
    fn test_parse_flattens_segments() {
        let xml = document(&format!(
            "<trk><name>Lunch run</name><trkseg>{}{}</trkseg><trkseg>{}</trkseg></trk>",
            trkpt(46.0, 7.0, Some(100.0), Some("2024-05-01T10:00:00Z")),
            trkpt(46.001, 7.0, Some(101.5), Some("2024-05-01T10:00:05Z")),
            trkpt(46.002, 7.0, Some(103.0), Some("2024-05-01T10:00:10Z")),
        ));

        let track = parse(&xml).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track.name(), Some("Lunch run"));
        assert_eq!(track.points()[1].elevation, 101.5);
        assert_eq!(track.points()[2].latitude, 46.002);
        assert_eq!(
            (track.points()[2].timestamp - track.points()[0].timestamp).num_seconds(),
            10
        );
    }

    #[test]
    fn test_offset_timestamps_normalized_to_utc() {
        let xml = document(&format!(
            "<trk><trkseg>{}{}</trkseg></trk>",
            trkpt(46.0, 7.0, Some(100.0), Some("2024-05-01T12:00:00+02:00")),
            trkpt(46.001, 7.0, Some(101.0), Some("2024-05-01T10:00:30Z")),
        ));

        let track = parse(&xml).unwrap();
        let ts = track.points()[0].timestamp;
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert_eq!((track.points()[1].timestamp - ts).num_seconds(), 30);
    }

    #[test]
    fn test_latitude_out_of_range() {
        let xml = document(&format!(
            "<trk><trkseg>{}</trkseg></trk>",
            trkpt(95.0, 7.0, Some(100.0), Some("2024-05-01T10:00:00Z")),
        ));

        let err = parse(&xml).unwrap_err();
        assert!(matches!(
            err,
            TrailError::Data(DataError::CoordinateOutOfRange { ref coordinate, value })
                if coordinate == "latitude" && value == 95.0
        ));
    }

    #[test]
    fn test_longitude_out_of_range() {
        let xml = document(&format!(
            "<trk><trkseg>{}</trkseg></trk>",
            trkpt(46.0, 181.0, Some(100.0), Some("2024-05-01T10:00:00Z")),
        ));

        let err = parse(&xml).unwrap_err();
        assert!(matches!(
            err,
            TrailError::Data(DataError::CoordinateOutOfRange { ref coordinate, .. })
                if coordinate == "longitude"
        ));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse("<gpx><trk>").unwrap_err();
        assert!(matches!(err, TrailError::Parse(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_no_tracks() {
        let err = parse(&document("")).unwrap_err();
        assert!(matches!(
            err,
            TrailError::Parse(ParseError::MissingStructure { .. })
        ));
    }

    #[test]
    fn test_no_points() {
        let err = parse(&document("<trk><trkseg></trkseg></trk>")).unwrap_err();
        assert!(matches!(
            err,
            TrailError::Parse(ParseError::MissingStructure { .. })
        ));
    }

    #[test]
    fn test_missing_elevation_rejects_track() {
        let xml = document(&format!(
            "<trk><trkseg>{}{}</trkseg></trk>",
            trkpt(46.0, 7.0, Some(100.0), Some("2024-05-01T10:00:00Z")),
            trkpt(46.001, 7.0, None, Some("2024-05-01T10:00:05Z")),
        ));

        let err = parse(&xml).unwrap_err();
        assert!(matches!(
            err,
            TrailError::Data(DataError::MissingElevation { index: 1 })
        ));
    }

    #[test]
    fn test_missing_time_rejects_track() {
        let xml = document(&format!(
            "<trk><trkseg>{}</trkseg></trk>",
            trkpt(46.0, 7.0, Some(100.0), None),
        ));

        let err = parse(&xml).unwrap_err();
        assert!(matches!(
            err,
            TrailError::Data(DataError::MissingTimestamp { index: 0 })
        ));
    }

    fn unordered_document() -> String {
        document(&format!(
            "<trk><trkseg>{}{}{}</trkseg></trk>",
            trkpt(46.0, 7.0, Some(100.0), Some("2024-05-01T10:00:10Z")),
            trkpt(46.001, 7.0, Some(100.0), Some("2024-05-01T10:00:00Z")),
            trkpt(46.002, 7.0, Some(100.0), Some("2024-05-01T10:00:20Z")),
        ))
    }

    #[test]
    fn test_out_of_order_rejected_by_default() {
        let err = parse(&unordered_document()).unwrap_err();
        assert!(matches!(
            err,
            TrailError::Data(DataError::TimestampOutOfOrder { index: 1 })
        ));
    }

    #[test]
    fn test_out_of_order_sorted() {
        let importer = GpxImporter::with_timestamp_policy(TimestampPolicy::Sort);
        let track = importer.parse_reader(unordered_document().as_bytes()).unwrap();
        assert_eq!(track.points()[0].latitude, 46.001);
        assert_eq!(track.points()[1].latitude, 46.0);
    }

    #[test]
    fn test_out_of_order_allowed() {
        let importer = GpxImporter::with_timestamp_policy(TimestampPolicy::Allow);
        let track = importer.parse_reader(unordered_document().as_bytes()).unwrap();
        assert_eq!(track.points()[0].latitude, 46.0);
    }

    #[test]
    fn test_missing_file() {
        let err = GpxImporter::new()
            .import_file(Path::new("/nonexistent/track.gpx"))
            .unwrap_err();
        assert!(matches!(
            err,
            TrailError::Parse(ParseError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_can_import_extension() {
        let importer = GpxImporter::new();
        assert!(importer.can_import(Path::new("ride.GPX")));
        assert!(!importer.can_import(Path::new("ride.fit")));
    }
}
