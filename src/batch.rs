//! Parallel analysis of a directory of tracks using rayon
//!
//! Every file gets its own `Track`; results are shared through one
//! `TrackCache`, so re-running a batch only computes new paths.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::analysis::{analyze_file, AnalysisOptions, TrackAnalysis};
use crate::cache::TrackCache;
use crate::error::Result;
use crate::import::ImportManager;

/// Configuration for batch analysis
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Show progress bar while analyzing
    pub show_progress: bool,
    pub options: AnalysisOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            options: AnalysisOptions::default(),
        }
    }
}

/// Outcome for a single file
#[derive(Debug, Clone)]
pub struct FileAnalysisResult {
    pub file_path: PathBuf,
    pub analysis: Option<Arc<TrackAnalysis>>,
    pub duration_ms: u128,
    /// Error message if parsing or analysis failed
    pub error: Option<String>,
}

impl FileAnalysisResult {
    pub fn is_success(&self) -> bool {
        self.analysis.is_some()
    }
}

/// Summary of one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    /// Sum of kept distance over successful files, km
    pub total_distance_km: f64,
    pub total_duration_ms: u128,
    /// Per-file results, in input order
    pub results: Vec<FileAnalysisResult>,
}

impl BatchSummary {
    pub fn is_fully_successful(&self) -> bool {
        self.failed_files == 0
    }

    /// Get human-readable summary
    pub fn to_string_pretty(&self) -> String {
        format!(
            "Batch Analysis Summary\n  \
             Total Files: {}\n  \
             Successful: {}\n  \
             Failed: {}\n  \
             Total Distance: {:.2} km\n  \
             Total Time: {:.2}s",
            self.total_files,
            self.successful_files,
            self.failed_files,
            self.total_distance_km,
            self.total_duration_ms as f64 / 1000.0,
        )
    }
}

pub struct BatchAnalyzer {
    pub config: BatchConfig,
    importer: ImportManager,
    cache: Arc<TrackCache>,
}

impl BatchAnalyzer {
    pub fn new(config: BatchConfig, importer: ImportManager, cache: Arc<TrackCache>) -> Self {
        Self {
            config,
            importer,
            cache,
        }
    }

    /// Analyze every importable file in a directory
    pub fn analyze_directory(&self, dir_path: &Path) -> Result<BatchSummary> {
        debug!(dir = %dir_path.display(), "Scanning directory for tracks");
        let files = self.importer.collect_importable_files(dir_path)?;

        if files.is_empty() {
            warn!("No GPX files found in directory: {}", dir_path.display());
            return Ok(BatchSummary::default());
        }

        info!("Found {} GPX files in directory", files.len());
        Ok(self.analyze_files(&files))
    }

    /// Analyze files in parallel; failures are collected, not propagated
    pub fn analyze_files(&self, file_paths: &[PathBuf]) -> BatchSummary {
        let start_time = Instant::now();
        let progress = self.progress_bar(file_paths.len());

        let results: Vec<FileAnalysisResult> = file_paths
            .par_iter()
            .map(|file_path| {
                let result = self.analyze_one(file_path);
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                result
            })
            .collect();

        if let Some(pb) = progress {
            pb.finish_with_message("Complete");
        }

        let successful_files = results.iter().filter(|r| r.is_success()).count();
        let total_distance_km = results
            .iter()
            .filter_map(|r| r.analysis.as_ref())
            .map(|a| a.analysis.metrics.total_distance_km)
            .sum();

        let summary = BatchSummary {
            total_files: file_paths.len(),
            successful_files,
            failed_files: file_paths.len() - successful_files,
            total_distance_km,
            total_duration_ms: start_time.elapsed().as_millis(),
            results,
        };

        info!("{}", summary.to_string_pretty());
        summary
    }

    fn analyze_one(&self, file_path: &Path) -> FileAnalysisResult {
        let file_start = Instant::now();
        let outcome = self.cache.get_or_compute(file_path, |path| {
            analyze_file(path, &self.importer, &self.config.options)
        });
        let duration_ms = file_start.elapsed().as_millis();

        match outcome {
            Ok(analysis) => FileAnalysisResult {
                file_path: file_path.to_path_buf(),
                analysis: Some(analysis),
                duration_ms,
                error: None,
            },
            Err(e) => {
                warn!(file = %file_path.display(), error = %e, "Failed to analyze track");
                FileAnalysisResult {
                    file_path: file_path.to_path_buf(),
                    analysis: None,
                    duration_ms,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="trailstat-tests" xmlns="http://www.topografix.com/GPX/1/1">
<trk><trkseg>
<trkpt lat="46.0000" lon="7.0"><ele>500</ele><time>2024-05-01T10:00:00Z</time></trkpt>
<trkpt lat="46.0010" lon="7.0"><ele>505</ele><time>2024-05-01T10:00:30Z</time></trkpt>
<trkpt lat="46.0020" lon="7.0"><ele>510</ele><time>2024-05-01T10:01:00Z</time></trkpt>
</trkseg></trk>
</gpx>"#;

    fn analyzer(cache: Arc<TrackCache>) -> BatchAnalyzer {
        BatchAnalyzer::new(
            BatchConfig {
                show_progress: false,
                ..BatchConfig::default()
            },
            ImportManager::default(),
            cache,
        )
    }

    #[test]
    fn test_directory_with_good_and_bad_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.gpx"), TRACK).unwrap();
        std::fs::write(dir.path().join("b.gpx"), "<not-gpx>").unwrap();
        std::fs::write(dir.path().join("c.txt"), TRACK).unwrap();

        let cache = Arc::new(TrackCache::new());
        let summary = analyzer(Arc::clone(&cache))
            .analyze_directory(dir.path())
            .unwrap();

        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.successful_files, 1);
        assert_eq!(summary.failed_files, 1);
        assert!(!summary.is_fully_successful());
        assert!(summary.results[0].is_success());
        assert!(summary.results[1].error.is_some());
        assert!((summary.total_distance_km - 0.2224).abs() < 0.001);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_rerun_uses_cache() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.gpx"), TRACK).unwrap();

        let cache = Arc::new(TrackCache::new());
        let batch = analyzer(Arc::clone(&cache));
        batch.analyze_directory(dir.path()).unwrap();
        batch.analyze_directory(dir.path()).unwrap();

        assert_eq!(cache.metrics().computations, 1);
        assert_eq!(cache.metrics().cache_hits, 1);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        let summary = analyzer(Arc::new(TrackCache::new()))
            .analyze_directory(dir.path())
            .unwrap();
        assert_eq!(summary.total_files, 0);
        assert!(summary.is_fully_successful());
    }

    #[test]
    fn test_summary_pretty_print() {
        let summary = BatchSummary {
            total_files: 5,
            successful_files: 5,
            total_distance_km: 42.5,
            total_duration_ms: 500,
            ..BatchSummary::default()
        };

        let pretty = summary.to_string_pretty();
        assert!(pretty.contains("Batch Analysis Summary"));
        assert!(pretty.contains("Total Files: 5"));
        assert!(pretty.contains("42.50 km"));
    }
}
