// Library interface for trailstat
// The binary and the integration tests both go through these modules

pub mod analysis;
pub mod batch;
pub mod cache;
pub mod config;
pub mod energy;
pub mod error;
pub mod export;
pub mod geo;
pub mod import;
pub mod logging;
pub mod models;
pub mod segments;
pub mod smoothing;
pub mod summary;

// Re-export commonly used types for convenience
pub use models::*;
pub use analysis::{analyze, analyze_file, analyze_with, Analysis, AnalysisOptions, TrackAnalysis};
pub use batch::{BatchAnalyzer, BatchConfig, BatchSummary};
pub use cache::{CacheMetrics, TrackCache};
pub use config::AppConfig;
pub use energy::{estimate_energy, estimate_for_profile, suggest_activity};
pub use error::{CalculationError, DataError, ParseError, ProfileIncomplete, Result, TrailError};
pub use geo::haversine;
pub use import::{parse, ImportManager, TimestampPolicy};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use smoothing::smooth;
pub use summary::{format_duration, summarize};
