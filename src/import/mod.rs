use crate::error::{Result, TrailError};
use crate::models::Track;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod gpx;

/// What the parser does with timestamps that go backwards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// Fail with `DataError::TimestampOutOfOrder`
    #[default]
    Reject,
    /// Stable-sort points by time
    Sort,
    /// Keep document order; backwards segments are discarded during analysis
    Allow,
}

impl std::str::FromStr for TimestampPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(TimestampPolicy::Reject),
            "sort" => Ok(TimestampPolicy::Sort),
            "allow" => Ok(TimestampPolicy::Allow),
            _ => Err(format!("Invalid timestamp policy: {}", s)),
        }
    }
}

/// Trait for importing tracks from different file formats
pub trait ImportFormat: Send + Sync {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Import a track from the file
    fn import_file(&self, file_path: &Path) -> Result<Track>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Parse a GPX file with the default (rejecting) timestamp policy
pub fn parse(file_path: &Path) -> Result<Track> {
    gpx::GpxImporter::new().import_file(file_path)
}

/// Manager for coordinating different import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new(timestamp_policy: TimestampPolicy) -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![Box::new(
            gpx::GpxImporter::with_timestamp_policy(timestamp_policy),
        )];

        Self { importers }
    }

    /// Import a single file, picking the importer by extension
    pub fn import_file(&self, file_path: &Path) -> Result<Track> {
        for importer in &self.importers {
            if importer.can_import(file_path) {
                debug!(
                    file = %file_path.display(),
                    format = importer.get_format_name(),
                    "Importing track"
                );
                return importer.import_file(file_path);
            }
        }

        Err(TrailError::Configuration(format!(
            "No importer found for file: {}",
            file_path.display()
        )))
    }

    /// Collect all files that can be imported from a directory, sorted by name
    pub fn collect_importable_files(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if !dir_path.is_dir() {
            return Err(TrailError::Configuration(format!(
                "Path is not a directory: {}",
                dir_path.display()
            )));
        }

        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();
            if path.is_file() && self.can_import_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers
            .iter()
            .any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new(TimestampPolicy::default())
    }
}
